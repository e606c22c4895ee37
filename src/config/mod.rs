//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PERSONA_ENGINE`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use persona_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Engine mode: {}", config.features.persona_engine_mode);
//! ```

mod error;
mod features;
mod logging;
mod persona;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use features::{EngineMode, FeatureFlags};
pub use logging::LoggingConfig;
pub use persona::PersonaConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads successfully.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Refresh policy, caps and inference windows
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Feature flags (engine mode)
    #[serde(default)]
    pub features: FeatureFlags,

    /// Persona and mood-history storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `PERSONA_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSONA_ENGINE__FEATURES__PERSONA_ENGINE_MODE=legacy`
    /// - `PERSONA_ENGINE__PERSONA__REFRESH_INTERVAL_SECS=3600`
    /// - `PERSONA_ENGINE__STORAGE__BACKEND=file`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSONA_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.persona.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PERSONA_ENGINE__FEATURES__PERSONA_ENGINE_MODE",
        "PERSONA_ENGINE__PERSONA__REFRESH_INTERVAL_SECS",
        "PERSONA_ENGINE__STORAGE__BACKEND",
        "PERSONA_ENGINE__STORAGE__DATA_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.features.persona_engine_mode, EngineMode::Enhanced);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.persona.refresh_interval_secs, 6 * 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_ENGINE__FEATURES__PERSONA_ENGINE_MODE", "legacy");
        env::set_var("PERSONA_ENGINE__PERSONA__REFRESH_INTERVAL_SECS", "3600");
        env::set_var("PERSONA_ENGINE__STORAGE__BACKEND", "file");
        env::set_var("PERSONA_ENGINE__STORAGE__DATA_DIR", "/var/lib/persona");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.features.persona_engine_mode, EngineMode::Legacy);
        assert_eq!(config.persona.refresh_interval_secs, 3600);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_file_backend_without_dir() {
        let config = AppConfig {
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_dir: None,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
