//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::ResolverConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
///
/// Precedence, lowest to highest: built-in defaults, the global file
/// (`$XDG_CONFIG_HOME/agent-resolver/config.toml`), an explicit file, then
/// `AGENT_RESOLVER__SECTION__KEY` environment variables.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<ResolverConfig, ApiError> {
        let config = MergeService::load(None)?;
        Self::validated(config)
    }

    /// Load configuration with `path` layered over the global file.
    pub fn load_from_file(path: &Path) -> Result<ResolverConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = MergeService::load(Some(path))?;
        Self::validated(config)
    }

    fn validated(config: ResolverConfig) -> Result<ResolverConfig, ApiError> {
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }
}
