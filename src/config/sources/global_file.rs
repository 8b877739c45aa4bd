//! Global config file: $XDG_CONFIG_HOME/agent-resolver/config.toml

use crate::config::paths;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use tracing::debug;

/// Add the global config file to builder when it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = paths::global_config_path() else {
        return Ok(builder);
    };
    if !path.exists() {
        return Ok(builder);
    }
    debug!(path = %path.display(), "Loading global config");
    Ok(builder.add_source(File::from(path).required(false)))
}
