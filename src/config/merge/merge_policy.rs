//! Builder seeded with the built-in defaults.

use crate::config::ResolverConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder whose lowest layer is [`ResolverConfig::default`].
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&ResolverConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
