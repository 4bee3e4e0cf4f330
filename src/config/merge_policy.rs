//! Merge rules: defaults applied beneath every other source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("frames.first_frame_id", 0i64)?
        .set_default("shutdown.policy", "match_id")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}
