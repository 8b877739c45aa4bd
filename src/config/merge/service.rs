//! MergeService: orchestrates sources, applies merge policy, deserializes to ResolverConfig.

use crate::config::sources::{environment, global_file};
use crate::config::ResolverConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources plus an optional explicit file.
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<ResolverConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = Self::add_explicit_file(builder, explicit);
        let builder = environment::add_to_builder(builder)?;
        Self::finish(builder)
    }

    pub(crate) fn add_explicit_file(
        builder: ConfigBuilder<DefaultState>,
        explicit: Option<&Path>,
    ) -> ConfigBuilder<DefaultState> {
        match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder,
        }
    }

    pub(crate) fn finish(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ResolverConfig, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
