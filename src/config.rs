use std::path::Path;

use tracing::warn;

use crate::ai::algorithms::AcConfig;
use crate::ai::networks::NetworkConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub actor_critic: AcConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network.validate()?;

        if self.actor_critic.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "actor_critic.learning_rate must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.actor_critic.gamma) {
            return Err(ConfigError::Validation(
                "actor_critic.gamma must be in [0, 1]".into(),
            ));
        }

        if self.training.num_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.num_episodes must be > 0".into(),
            ));
        }
        if self.training.max_turns == 0 {
            return Err(ConfigError::Validation(
                "training.max_turns must be > 0".into(),
            ));
        }
        if self.training.checkpoint_interval == 0 {
            return Err(ConfigError::Validation(
                "training.checkpoint_interval must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }

        if self.checkpoint.keep_last_n == 0 {
            return Err(ConfigError::Validation(
                "checkpoint.keep_last_n must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Render every default value as TOML, for writing an example config file.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| ConfigError::Validation(format!("cannot render defaults: {e}")))
    }
}
