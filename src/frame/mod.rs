//! Frames
//!
//! Leaf content units. Each frame is created by exactly one page, lives in that page's
//! frame collection for its whole life, and is never copied or transferred.

pub mod registry;

pub use registry::FrameRegistry;

use crate::types::{FrameId, PageId};
use std::sync::Weak;

/// A content frame
#[derive(Debug)]
pub struct Frame {
    id: FrameId,
    name: String,
    owner: PageId,
}

impl Frame {
    pub(crate) fn new(id: FrameId, name: String, owner: PageId) -> Self {
        Frame { id, name, owner }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Display name. May be empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The page holding this frame.
    pub fn owner(&self) -> PageId {
        self.owner
    }
}

/// Non-owning reference to a frame.
///
/// Returned by registry lookups. Access goes through [`FrameRef::with`], which only
/// lends the frame for the duration of the closure, so a `FrameRef` can never keep a
/// released frame alive.
#[derive(Debug, Clone)]
pub struct FrameRef {
    id: FrameId,
    frame: Weak<Frame>,
}

impl FrameRef {
    pub(crate) fn new(id: FrameId, frame: Weak<Frame>) -> Self {
        Self { id, frame }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.frame.strong_count() > 0
    }

    /// Run `f` against the frame, or return `None` if it was released.
    pub fn with<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        self.frame.upgrade().map(|frame| f(&frame))
    }

    pub(crate) fn downgrade(&self) -> Weak<Frame> {
        self.frame.clone()
    }
}
