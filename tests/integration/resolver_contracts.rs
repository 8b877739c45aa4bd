use std::sync::Arc;
use std::time::Duration;

use agent_resolver::chain::{CollectionRef, RawCollection};
use agent_resolver::error::{ChainError, ResolveError};
use agent_resolver::types::Address;
use agent_resolver::{AgentResolver, OwnerFilter, ResolverSettings};
use serde_json::json;

use crate::support::{
    address, fast_settings, in_collection, resolver, token, Behavior, FakeChain, FakeContent,
};

fn uri_of(mint: &str) -> String {
    format!("https://arweave.net/{}", mint)
}

#[tokio::test]
async fn current_schema_wins_over_legacy_block() {
    let mint = address(1);
    let content = Arc::new(FakeContent::new().serve(
        &uri_of(&mint),
        Behavior::Document(json!({
            "name": "Researcher",
            "description": "Current prompt",
            "attributes": [
                { "trait_type": "model", "value": "gpt-4o" },
                { "trait_type": "temperature", "value": 0.2 }
            ],
            "x402_agent": {
                "model": "legacy-model",
                "temperature": 0.9,
                "system_prompt": "Legacy prompt"
            }
        })),
    ));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        content,
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert_eq!(agent.model.as_deref(), Some("gpt-4o"));
    assert_eq!(agent.temperature, Some(0.2));
    assert_eq!(agent.prompt.as_deref(), Some("Current prompt"));
}

#[tokio::test]
async fn legacy_block_fills_missing_fields() {
    let mint = address(2);
    let content = Arc::new(FakeContent::new().serve(
        &uri_of(&mint),
        Behavior::Document(json!({
            "name": "Old agent",
            "image": "https://arweave.net/img",
            "x402_agent": {
                "model": "claude-3",
                "temperature": "0.6",
                "system_prompt": "Be terse."
            }
        })),
    ));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        content,
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert_eq!(agent.model.as_deref(), Some("claude-3"));
    assert_eq!(agent.temperature, Some(0.6));
    assert_eq!(agent.prompt.as_deref(), Some("Be terse."));
    assert_eq!(agent.image.as_deref(), Some("https://arweave.net/img"));
    assert!(agent.has_metadata());
}

#[tokio::test]
async fn non_numeric_temperature_is_absent() {
    let mint = address(3);
    let content = Arc::new(FakeContent::new().serve(
        &uri_of(&mint),
        Behavior::Document(json!({
            "x402_agent": { "model": "m", "temperature": "abc" }
        })),
    ));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        content,
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert_eq!(agent.temperature, None);
    assert_eq!(agent.model.as_deref(), Some("m"));
}

#[tokio::test]
async fn unavailable_document_degrades_record() {
    let mint = address(4);
    let uri = uri_of(&mint);
    let content = Arc::new(FakeContent::new().serve(&uri, Behavior::Status(503)));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        Arc::clone(&content),
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert_eq!(agent.mint, mint);
    assert_eq!(agent.symbol, "H402");
    assert_eq!(agent.uri, uri);
    assert!(agent.name.starts_with("Agent "));
    assert!(!agent.has_metadata());
    assert!(agent.model.is_none() && agent.prompt.is_none() && agent.temperature.is_none());
    assert_eq!(content.calls(&uri), 3);
}

#[tokio::test(start_paused = true)]
async fn default_policy_makes_eight_attempts_before_degrading() {
    let mint = address(5);
    let uri = uri_of(&mint);
    let content = Arc::new(FakeContent::new().serve(&uri, Behavior::Status(404)));
    let resolver = AgentResolver::new(
        Arc::new(FakeChain::new().with_token(token(&mint, "H402"))),
        Arc::clone(&content) as Arc<dyn agent_resolver::ContentFetcher>,
    );

    let started = tokio::time::Instant::now();
    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();

    assert!(!agent.has_metadata());
    assert_eq!(content.calls(&uri), 8);
    assert!(started.elapsed() >= Duration::from_millis(10_500));
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let mint = address(6);
    let uri = uri_of(&mint);
    let content = Arc::new(FakeContent::new().serve(
        &uri,
        Behavior::Flaky {
            failures: 2,
            document: json!({ "description": "Recovered" }),
        },
    ));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        Arc::clone(&content),
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert_eq!(agent.prompt.as_deref(), Some("Recovered"));
    assert_eq!(content.calls(&uri), 3);
}

#[tokio::test]
async fn malformed_document_is_not_retried() {
    let mint = address(7);
    let uri = uri_of(&mint);
    let content = Arc::new(FakeContent::new().serve(&uri, Behavior::Garbage));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        Arc::clone(&content),
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert!(!agent.has_metadata());
    assert_eq!(content.calls(&uri), 1);
}

#[tokio::test]
async fn non_object_document_degrades_record() {
    let mint = address(8);
    let content = Arc::new(
        FakeContent::new().serve(&uri_of(&mint), Behavior::Document(json!(["not", "an", "object"]))),
    );
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        content,
    );

    let agent = resolver.resolve_by_mint(&mint).await.unwrap().unwrap();
    assert!(!agent.has_metadata());
    assert!(agent.raw_document.is_none());
}

#[tokio::test]
async fn owner_filter_by_symbol_sorts_by_mint_descending() {
    let owner = address(20);
    let (a, b, c) = (address(21), address(22), address(23));
    let tokens = vec![token(&a, "H402"), token(&b, "h402"), token(&c, "OTHER")];
    let content = Arc::new(
        FakeContent::new()
            .serve(&uri_of(&a), Behavior::Document(json!({ "description": "a" })))
            .serve(&uri_of(&b), Behavior::Document(json!({ "description": "b" }))),
    );
    let resolver = resolver(FakeChain::new().with_owner(&owner, tokens), Arc::clone(&content));

    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::with_symbol("H402"))
        .await
        .unwrap();

    let mut expected = vec![a.clone(), b.clone()];
    expected.sort_by(|x, y| y.cmp(x));
    let mints: Vec<String> = agents.iter().map(|agent| agent.mint.clone()).collect();
    assert_eq!(mints, expected);
    assert_eq!(content.calls(&uri_of(&c)), 0);
}

#[tokio::test]
async fn owner_filter_defaults_to_configured_symbol() {
    let owner = address(30);
    let (a, b) = (address(31), address(32));
    let tokens = vec![token(&a, "H402"), token(&b, "CUSTOM")];
    let settings = ResolverSettings {
        default_symbol: "custom".to_string(),
        ..fast_settings()
    };
    let resolver = AgentResolver::with_settings(
        Arc::new(FakeChain::new().with_owner(&owner, tokens)),
        Arc::new(FakeContent::new()),
        settings,
    );

    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::default())
        .await
        .unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].mint, b);
}

#[tokio::test]
async fn duplicate_holdings_resolve_once() {
    let owner = address(35);
    let a = address(36);
    let tokens = vec![token(&a, "H402"), token(&a, "H402")];
    let resolver = resolver(
        FakeChain::new().with_owner(&owner, tokens),
        Arc::new(FakeContent::new()),
    );

    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::default())
        .await
        .unwrap();
    assert_eq!(agents.len(), 1);
}

#[tokio::test]
async fn both_collection_shapes_satisfy_filter() {
    let owner = address(40);
    let collection = address(49);
    let (bare, wrapped, unverified, other) = (address(41), address(42), address(43), address(44));

    let bare_ref = RawCollection::Key(collection.clone()).normalize();
    let wrapped_ref = RawCollection::Wrapped {
        key: collection.clone(),
        verified: true,
    }
    .normalize();
    let unverified_ref = Some(CollectionRef {
        address: collection.clone(),
        verified: false,
    });
    let other_ref = Some(CollectionRef {
        address: address(50),
        verified: true,
    });

    let tokens = vec![
        in_collection(token(&bare, "H402"), bare_ref),
        in_collection(token(&wrapped, "H402"), wrapped_ref),
        in_collection(token(&unverified, "H402"), unverified_ref),
        in_collection(token(&other, "H402"), other_ref),
        token(&address(45), "H402"),
    ];
    let resolver = resolver(
        FakeChain::new().with_owner(&owner, tokens),
        Arc::new(FakeContent::new()),
    );

    let filter = OwnerFilter::with_symbol("H402").in_collection(Address::parse(&collection).unwrap());
    let agents = resolver.resolve_by_owner(&owner, &filter).await.unwrap();

    let mut mints: Vec<String> = agents.into_iter().map(|agent| agent.mint).collect();
    mints.sort();
    let mut expected = vec![bare, wrapped, unverified];
    expected.sort();
    assert_eq!(mints, expected);
}

#[tokio::test]
async fn repeated_resolution_is_identical() {
    let mint = address(60);
    let content = Arc::new(FakeContent::new().serve(
        &uri_of(&mint),
        Behavior::Document(json!({
            "description": "Stable",
            "attributes": [{ "traitType": "Model", "value": 4 }]
        })),
    ));
    let resolver = resolver(
        FakeChain::new().with_token(token(&mint, "H402")),
        content,
    );

    let first = resolver.resolve_by_mint(&mint).await.unwrap();
    let second = resolver.resolve_by_mint(&mint).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.unwrap().model.as_deref(), Some("4"));
}

#[tokio::test]
async fn owner_without_agents_yields_empty_list() {
    let owner = address(70);
    let resolver = resolver(
        FakeChain::new().with_owner(&owner, vec![token(&address(71), "OTHER")]),
        Arc::new(FakeContent::new()),
    );
    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::default())
        .await
        .unwrap();
    assert!(agents.is_empty());

    let stranger = address(72);
    let agents = resolver
        .resolve_by_owner(&stranger, &OwnerFilter::default())
        .await
        .unwrap();
    assert!(agents.is_empty());
}

#[tokio::test]
async fn unknown_or_malformed_mint_is_not_found() {
    let resolver = resolver(FakeChain::new(), Arc::new(FakeContent::new()));
    assert!(resolver.resolve_by_mint(&address(80)).await.unwrap().is_none());
    assert!(resolver.resolve_by_mint("not-base58-0OIl").await.unwrap().is_none());
    assert!(resolver.resolve_by_mint("").await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_owner_is_rejected() {
    let resolver = resolver(FakeChain::new(), Arc::new(FakeContent::new()));
    let err = resolver
        .resolve_by_owner("short", &OwnerFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidAddress(_)));
}

#[tokio::test]
async fn chain_failures_propagate() {
    let transport = || ChainError::Transport("connection refused".to_string());
    let resolver = resolver(FakeChain::failing(transport), Arc::new(FakeContent::new()));

    let err = resolver.resolve_by_mint(&address(90)).await.unwrap_err();
    assert!(matches!(err, ResolveError::Chain(ChainError::Transport(_))));

    let err = resolver
        .resolve_by_owner(&address(91), &OwnerFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Chain(ChainError::Transport(_))));
}

#[tokio::test(start_paused = true)]
async fn owner_fetches_are_bounded() {
    let owner = address(100);
    let tokens: Vec<_> = (101..111).map(|n| token(&address(n), "H402")).collect();
    let content = tokens.iter().fold(
        FakeContent::new().with_delay(Duration::from_millis(50)),
        |content, token| {
            content.serve(
                &token.content_uri,
                Behavior::Document(json!({ "description": token.mint })),
            )
        },
    );
    let content = Arc::new(content);
    let settings = ResolverSettings {
        max_concurrent_fetches: 3,
        ..fast_settings()
    };
    let resolver = AgentResolver::with_settings(
        Arc::new(FakeChain::new().with_owner(&owner, tokens)),
        Arc::clone(&content) as Arc<dyn agent_resolver::ContentFetcher>,
        settings,
    );

    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::default())
        .await
        .unwrap();

    assert_eq!(agents.len(), 10);
    assert!(agents.windows(2).all(|pair| pair[0].mint > pair[1].mint));
    assert!(agents.iter().all(|agent| agent.prompt.as_deref() == Some(agent.mint.as_str())));
    assert_eq!(content.max_in_flight(), 3);
}

#[tokio::test]
async fn one_failing_document_does_not_affect_siblings() {
    let owner = address(120);
    let (good, bad) = (address(121), address(122));
    let content = Arc::new(
        FakeContent::new()
            .serve(&uri_of(&good), Behavior::Document(json!({ "description": "ok" })))
            .serve(&uri_of(&bad), Behavior::Status(500)),
    );
    let resolver = resolver(
        FakeChain::new().with_owner(&owner, vec![token(&good, "H402"), token(&bad, "H402")]),
        content,
    );

    let agents = resolver
        .resolve_by_owner(&owner, &OwnerFilter::default())
        .await
        .unwrap();
    assert_eq!(agents.len(), 2);
    let good_agent = agents.iter().find(|a| a.mint == good).unwrap();
    let bad_agent = agents.iter().find(|a| a.mint == bad).unwrap();
    assert!(good_agent.has_metadata());
    assert!(!bad_agent.has_metadata());
}
