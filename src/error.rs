//! Error types for the page/frame ownership graph.

use crate::types::{FrameId, PageId};
use thiserror::Error;

/// Frame registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Frame not found in registry: {0}")]
    NotFound(FrameId),
}

/// Errors returned by page, shutdown and handle operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Frame not found: {0}")]
    FrameNotFound(FrameId),

    #[error("No active page")]
    NoActivePage,

    #[error("Page {0} has no frames to destroy")]
    EmptyFrameSet(PageId),

    #[error("Frame {frame} is not owned by {page}")]
    FrameNotOwned { frame: FrameId, page: PageId },

    #[error("Frame {0} was already destroyed")]
    FrameDestroyed(FrameId),

    #[error("No platform engine attached to this context")]
    NoPlatform,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for HostError {
    fn from(err: config::ConfigError) -> Self {
        HostError::ConfigError(err.to_string())
    }
}
