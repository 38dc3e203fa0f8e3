//! Engine configuration
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults
//! 2. an optional TOML / YAML / JSON file
//! 3. environment variables prefixed `POSTING_LAYOUT_`
//!    (e.g. `POSTING_LAYOUT_STEP_DELETE=require_empty`)

use crate::error::{LayoutError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_PREFIX: &str = "POSTING_LAYOUT_";
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 16;
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// What deleting a step does to the fields it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDeletePolicy {
    /// Delete the step's fields along with it
    #[default]
    Cascade,
    /// Refuse while the step still owns fields
    RequireEmpty,
}

/// Tunables for the layout engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Upper bound on store writes in flight for one batch
    pub max_concurrent_writes: usize,
    /// Buffered notices per subscriber before the oldest are dropped
    pub notice_capacity: usize,
    pub step_delete: StepDeletePolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
            step_delete: StepDeletePolicy::default(),
        }
    }
}

impl LayoutConfig {
    /// Load from defaults and environment
    pub fn load() -> Result<Self> {
        Self::extract(Self::base())
    }

    /// Load from defaults, a config file, and environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            other => {
                return Err(LayoutError::invalid_value(
                    "config file",
                    format!("unsupported format: {}", other.unwrap_or("<none>")),
                ))
            }
        };
        debug!(path = %path.display(), "loading layout config file");

        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX));
        Self::extract(figment)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        debug!(?config, "layout config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_writes == 0 {
            return Err(LayoutError::invalid_value(
                "max_concurrent_writes",
                "must be at least 1",
            ));
        }
        if self.notice_capacity == 0 {
            return Err(LayoutError::invalid_value(
                "notice_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn with_step_delete(mut self, policy: StepDeletePolicy) -> Self {
        self.step_delete = policy;
        self
    }

    pub fn with_max_concurrent_writes(mut self, limit: usize) -> Self {
        self.max_concurrent_writes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_config(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    fn clear_env() {
        for key in ["MAX_CONCURRENT_WRITES", "NOTICE_CAPACITY", "STEP_DELETE"] {
            std::env::remove_var(format!("{ENV_PREFIX}{key}"));
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = LayoutConfig::load().unwrap();
        assert_eq!(config, LayoutConfig::default());
        assert_eq!(config.step_delete, StepDeletePolicy::Cascade);
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        clear_env();
        let mut file = temp_config(".toml");
        writeln!(file, "max_concurrent_writes = 4").unwrap();
        writeln!(file, "step_delete = \"require_empty\"").unwrap();

        let config = LayoutConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_concurrent_writes, 4);
        assert_eq!(config.step_delete, StepDeletePolicy::RequireEmpty);
        assert_eq!(config.notice_capacity, DEFAULT_NOTICE_CAPACITY);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let mut file = temp_config(".yaml");
        writeln!(file, "max_concurrent_writes: 4").unwrap();
        std::env::set_var("POSTING_LAYOUT_MAX_CONCURRENT_WRITES", "2");

        let config = LayoutConfig::load_from(file.path()).unwrap();
        clear_env();
        assert_eq!(config.max_concurrent_writes, 2);
    }

    #[test]
    #[serial]
    fn test_zero_concurrency_rejected() {
        clear_env();
        std::env::set_var("POSTING_LAYOUT_MAX_CONCURRENT_WRITES", "0");
        let result = LayoutConfig::load();
        clear_env();
        assert!(matches!(result, Err(LayoutError::InvalidValue { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = LayoutConfig::load_from("layout.ini");
        assert!(matches!(result, Err(LayoutError::InvalidValue { .. })));
    }
}
