//! Agent document parsing.
//!
//! Two schema generations of the off-chain JSON coexist and neither is ever
//! migrated. Each generation is read by its own parser into a partial record;
//! the partials are merged field by field with the current schema taking
//! priority over the legacy `x402_agent` block.

use serde_json::{Map, Value};

/// Name of the legacy configuration block.
pub const LEGACY_BLOCK: &str = "x402_agent";

/// Fields extracted from an agent document. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFields {
    pub image: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub external_url: Option<String>,
}

/// Agent settings carried by one schema generation.
#[derive(Debug, Clone, Default, PartialEq)]
struct AgentSettings {
    prompt: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
}

impl AgentSettings {
    /// Fill unset fields from `fallback`.
    fn or(self, fallback: AgentSettings) -> AgentSettings {
        AgentSettings {
            prompt: self.prompt.or(fallback.prompt),
            model: self.model.or(fallback.model),
            temperature: self.temperature.or(fallback.temperature),
        }
    }
}

/// Parse a fetched document. Non-object input yields all-absent fields.
pub fn parse_document(document: &Value) -> DocumentFields {
    let Some(object) = document.as_object() else {
        return DocumentFields::default();
    };

    let settings = parse_current(object).or(parse_legacy(object));

    DocumentFields {
        image: string_field(object, "image"),
        prompt: settings.prompt,
        model: settings.model,
        temperature: settings.temperature,
        external_url: string_field(object, "external_url"),
    }
}

/// Current schema: `description` plus `attributes` trait list.
fn parse_current(object: &Map<String, Value>) -> AgentSettings {
    let mut settings = AgentSettings {
        prompt: string_field(object, "description"),
        ..AgentSettings::default()
    };

    let attributes = object
        .get("attributes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    // Later traits override earlier ones.
    for attribute in attributes {
        let Some(trait_type) = trait_type(attribute) else {
            continue;
        };
        let value = attribute.get("value");
        if trait_type.eq_ignore_ascii_case("model") {
            if let Some(model) = value.and_then(scalar_string) {
                settings.model = Some(model);
            }
        } else if trait_type.eq_ignore_ascii_case("temperature") {
            if let Some(temperature) = value.and_then(finite_number) {
                settings.temperature = Some(temperature);
            }
        }
    }

    settings
}

/// Legacy schema: nested `x402_agent` object.
fn parse_legacy(object: &Map<String, Value>) -> AgentSettings {
    let Some(legacy) = object.get(LEGACY_BLOCK).and_then(Value::as_object) else {
        return AgentSettings::default();
    };

    AgentSettings {
        prompt: string_field(legacy, "system_prompt"),
        model: legacy
            .get("model")
            .and_then(scalar_string)
            .filter(|model| !model.is_empty()),
        temperature: legacy.get("temperature").and_then(finite_number),
    }
}

fn trait_type(attribute: &Value) -> Option<&str> {
    attribute
        .get("trait_type")
        .or_else(|| attribute.get("traitType"))
        .and_then(Value::as_str)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// String or number rendered as a string.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number from a JSON number or numeric string.
pub(crate) fn finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}
