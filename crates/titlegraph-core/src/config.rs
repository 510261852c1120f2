//! Configuration for titlegraph services.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`TITLEGRAPH__` prefix, `__` separator)
//! 2. Config file (`titlegraph.toml`)
//! 3. Defaults

use serde::Deserialize;

use crate::TitleError;

/// Top-level titlegraph configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TitlegraphConfig {
    /// Ownership-resolution traversal budgets.
    #[serde(default)]
    pub resolve: ResolveSettings,
}

/// Traversal budgets for the ownership resolver.
///
/// Traversals are bounded per tract (the instrument set scoped to the tract),
/// so these are safety caps rather than tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveSettings {
    /// Maximum conveyance-path length considered during enumeration.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of root-to-party paths enumerated per tract.
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
}

fn default_max_depth() -> usize {
    32
}

fn default_max_paths() -> usize {
    10_000
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_paths: default_max_paths(),
        }
    }
}

impl TitlegraphConfig {
    /// Load from `<file_prefix>.toml` (optional) and `TITLEGRAPH__` env vars.
    pub fn load(file_prefix: &str) -> Result<Self, TitleError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("TITLEGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TitleError::Config(e.to_string()))?;

        cfg.try_deserialize()
            .map_err(|e| TitleError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let config = TitlegraphConfig::default();
        assert_eq!(config.resolve.max_depth, 32);
        assert_eq!(config.resolve.max_paths, 10_000);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let config = TitlegraphConfig::load("does-not-exist-titlegraph").unwrap();
        assert_eq!(config.resolve.max_depth, 32);
    }
}
