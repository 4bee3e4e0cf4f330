//! Logging System
//!
//! Structured logging using the `tracing` crate. The library only emits events;
//! embedding applications call [`init_logging`] once to install a subscriber.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("pagehost.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!("Invalid log level: {}", self.level));
        }
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.format
            ));
        }
        parse_output(&self.output)?;
        for (module, level) in &self.modules {
            if !LEVELS.contains(&level.as_str()) {
                return Err(format!("Invalid log level for {}: {}", module, level));
            }
        }
        Ok(())
    }
}

/// Output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

fn parse_output(output: &str) -> Result<Output, String> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        _ => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            output
        )),
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (PAGEHOST_LOG, PAGEHOST_LOG_FORMAT, PAGEHOST_LOG_OUTPUT,
///    PAGEHOST_LOG_MODULES)
/// 2. Configuration
/// 3. Defaults
///
/// Returns a `ConfigError` if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), HostError> {
    let filter = build_env_filter(config)?;
    let json = determine_format(config)? == "json";
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true);

    let base_subscriber = Registry::default().with(filter);
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339());

    let result = match (output, json) {
        (Output::File, json) => {
            let file_writer = open_log_file(config)?;
            if json {
                base_subscriber
                    .with(layer.json().with_writer(file_writer))
                    .try_init()
            } else {
                base_subscriber
                    .with(layer.with_ansi(false).with_writer(file_writer))
                    .try_init()
            }
        }
        (Output::Stdout, true) => base_subscriber
            .with(layer.json().with_writer(std::io::stdout))
            .try_init(),
        (Output::Stdout, false) => base_subscriber
            .with(layer.with_ansi(use_color).with_writer(std::io::stdout))
            .try_init(),
        (Output::Stderr, true) => base_subscriber
            .with(layer.json().with_writer(std::io::stderr))
            .try_init(),
        (Output::Stderr, false) => base_subscriber
            .with(layer.with_ansi(use_color).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| HostError::ConfigError(format!("Failed to install subscriber: {}", e)))
}

fn open_log_file(config: Option<&LoggingConfig>) -> Result<std::fs::File, HostError> {
    let log_file = config
        .map(|c| c.file.clone())
        .unwrap_or_else(default_log_file);

    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HostError::ConfigError(format!("Failed to create log directory: {}", e))
            })?;
        }
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .map_err(|e| {
            HostError::ConfigError(format!("Failed to open log file {:?}: {}", log_file, e))
        })
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, HostError> {
    if let Ok(filter) = EnvFilter::try_from_env("PAGEHOST_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            filter = filter.add_directive(parse_directive(module, module_level)?);
        }
    }

    if let Ok(modules_str) = std::env::var("PAGEHOST_LOG_MODULES") {
        for module_spec in modules_str.split(',') {
            if let Some((module, module_level)) = module_spec.split_once('=') {
                filter = filter.add_directive(parse_directive(module.trim(), module_level.trim())?);
            }
        }
    }

    Ok(filter)
}

fn parse_directive(
    module: &str,
    level: &str,
) -> Result<tracing_subscriber::filter::Directive, HostError> {
    format!("{}={}", module, level)
        .parse()
        .map_err(|e| HostError::ConfigError(format!("Invalid log directive: {}", e)))
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<String, HostError> {
    if let Ok(format) = std::env::var("PAGEHOST_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(HostError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<Output, HostError> {
    let output = std::env::var("PAGEHOST_LOG_OUTPUT")
        .ok()
        .unwrap_or_else(|| {
            config
                .map(|c| c.output.clone())
                .unwrap_or_else(default_output)
        });
    parse_output(&output).map_err(HostError::ConfigError)
}
