//! Wiring from configuration to a ready persona engine.

use std::sync::Arc;

use crate::adapters::{
    FileMoodHistoryStore, FilePersonaRepository, InMemoryMoodHistoryStore,
    InMemoryPersonaRepository,
};
use crate::application::integration::SafePersonaIntegration;
use crate::application::PersonaService;
use crate::config::{AppConfig, ConfigError, StorageBackend, ValidationError};
use crate::ports::{GamingDataReader, IdentityProvider, MoodHistoryStore, PersonaRepository};

/// The persona service and the integration façade sharing it.
pub struct PersonaEngine {
    pub service: Arc<PersonaService>,
    pub integration: SafePersonaIntegration,
}

impl PersonaEngine {
    /// Validates `config` and builds the engine over the configured storage.
    ///
    /// Gaming data and identity traits belong to the surrounding
    /// application and are passed in.
    pub fn build(
        config: &AppConfig,
        gaming_data: Arc<dyn GamingDataReader>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (personas, histories): (Arc<dyn PersonaRepository>, Arc<dyn MoodHistoryStore>) =
            match config.storage.backend {
                StorageBackend::Memory => (
                    Arc::new(InMemoryPersonaRepository::new()),
                    Arc::new(InMemoryMoodHistoryStore::new()),
                ),
                StorageBackend::File => {
                    let dir = config
                        .storage
                        .data_dir
                        .as_ref()
                        .ok_or(ValidationError::MissingRequired("storage.data_dir"))?;
                    (
                        Arc::new(FilePersonaRepository::new(dir)),
                        Arc::new(FileMoodHistoryStore::new(dir)),
                    )
                }
            };

        let service = Arc::new(PersonaService::new(
            personas,
            gaming_data,
            identity,
            config.persona.service_settings(),
        ));
        let integration =
            SafePersonaIntegration::from_flags(&config.features, service.clone(), histories);

        tracing::info!(
            mode = %integration.mode(),
            storage = ?config.storage.backend,
            "Persona engine ready"
        );
        Ok(Self {
            service,
            integration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryGamingData, StaticIdentityProvider};
    use crate::config::{EngineMode, FeatureFlags, StorageConfig};

    fn build(config: &AppConfig) -> Result<PersonaEngine, ConfigError> {
        PersonaEngine::build(
            config,
            Arc::new(InMemoryGamingData::new()),
            Arc::new(StaticIdentityProvider::new()),
        )
    }

    #[test]
    fn builds_with_defaults() {
        let engine = build(&AppConfig::default()).unwrap();
        assert_eq!(engine.integration.mode(), EngineMode::Enhanced);
    }

    #[test]
    fn honours_engine_mode_flag() {
        let config = AppConfig {
            features: FeatureFlags {
                persona_engine_mode: EngineMode::Legacy,
            },
            ..AppConfig::default()
        };
        assert_eq!(build(&config).unwrap().integration.mode(), EngineMode::Legacy);
    }

    #[test]
    fn file_backend_without_dir_is_rejected() {
        let config = AppConfig {
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_dir: None,
            },
            ..AppConfig::default()
        };
        assert!(matches!(
            build(&config),
            Err(ConfigError::ValidationFailed(ValidationError::MissingRequired(_)))
        ));
    }
}
