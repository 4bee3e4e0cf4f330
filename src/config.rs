//! Configuration System
//!
//! Layered configuration for a browser context: built-in defaults, the user config
//! file, an optional explicit file, then `PAGEHOST_*` environment variables.

use crate::error::HostError;
use crate::logging::LoggingConfig;
use crate::shutdown::ShutdownPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge_policy;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub frames: FrameConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Frame id allocation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameConfig {
    /// First id handed out by the frame registry
    #[serde(default)]
    pub first_frame_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShutdownConfig {
    #[serde(default)]
    pub policy: ShutdownPolicy,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Frames(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Frames(msg) => write!(f, "Frames: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl HostConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.frames.first_frame_id == u64::MAX {
            errors.push(ValidationError::Frames(
                "first_frame_id leaves no room for allocation".to_string(),
            ));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, HostError> {
        toml::to_string_pretty(self)
            .map_err(|e| HostError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

/// Loads [`HostConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    ///
    /// Precedence (lowest to highest): defaults, user config file, `explicit`
    /// file, environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<HostConfig, HostError> {
        let user_file = Self::user_config_path();
        Self::load_with_user_file(user_file.as_deref(), explicit)
    }

    /// Like [`ConfigLoader::load`], reading the user layer from `user_file`
    /// instead of the platform config directory. `None` skips the user layer.
    pub fn load_with_user_file(
        user_file: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<HostConfig, HostError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = sources::add_user_file(builder, user_file)?;
        if let Some(path) = explicit {
            builder = sources::add_file(builder, path, true)?;
        }
        builder = sources::add_environment(builder);

        let config: HostConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<HostConfig, HostError> {
        let builder = sources::add_file(merge_policy::builder_with_defaults()?, path, true)?;
        let config: HostConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Path of the user config file, if a config directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        sources::user_config_path()
    }

    fn validated(config: HostConfig) -> Result<HostConfig, HostError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            HostError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
