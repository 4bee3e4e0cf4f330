//! Config sources: user config file, explicit files, environment.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `<config dir>/pagehost/config.toml` for the current platform.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pagehost").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the user config file at `path` if it exists.
pub fn add_user_file(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path {
        Some(path) if path.exists() => add_file(builder, path, false),
        Some(path) => {
            debug!(config_path = %path.display(), "No user configuration file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}

pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    debug!(config_path = %path.display(), required, "Adding configuration file");
    Ok(builder.add_source(File::from(path).required(required)))
}

/// `PAGEHOST_SHUTDOWN__POLICY=first_owned` sets `shutdown.policy`.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("PAGEHOST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
