//! Environment variable source: AGENT_RESOLVER_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use std::collections::HashMap;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "AGENT_RESOLVER";

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Add environment variable overlay to builder.
/// Uses AGENT_RESOLVER__ prefix and __ as separator for nested keys,
/// e.g. `AGENT_RESOLVER__RETRY__MAX_ATTEMPTS=3`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment()))
}

/// Same overlay read from `vars` instead of the process environment.
pub(crate) fn add_source_map(
    builder: ConfigBuilder<DefaultState>,
    vars: HashMap<String, String>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(environment().source(Some(vars)))
}
