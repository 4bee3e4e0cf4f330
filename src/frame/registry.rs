//! Frame registry: process-wide index from frame id to a non-owning frame reference.

use crate::error::RegistryError;
use crate::frame::{Frame, FrameRef};
use crate::types::{FrameId, PageId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Frame registry
///
/// Holds `Weak` references only. Entries are removed by the owning page before it
/// releases a frame; a lookup that races with a release still fails cleanly because
/// the upgrade fails.
pub struct FrameRegistry {
    state: Mutex<RegistryState>,
}

struct RegistryState {
    next_id: u64,
    frames: BTreeMap<FrameId, Weak<Frame>>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::with_first_id(0)
    }

    /// Create a registry whose first allocated id is `first_id`
    pub fn with_first_id(first_id: u64) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_id: first_id,
                frames: BTreeMap::new(),
            }),
        }
    }

    /// Allocate an id, construct the frame and index it.
    ///
    /// The returned `Arc` is the owning reference; the caller (a page) must keep it
    /// for as long as the frame is alive. Ids are never reused.
    pub(crate) fn register(&self, name: impl Into<String>, owner: PageId) -> Arc<Frame> {
        let mut state = self.state.lock();
        let id = FrameId(state.next_id);
        state.next_id += 1;

        let frame = Arc::new(Frame::new(id, name.into(), owner));
        state.frames.insert(id, Arc::downgrade(&frame));
        debug!(frame_id = %id, page_id = %owner, "Registered frame");
        frame
    }

    /// Resolve a frame by id to a non-owning reference
    pub fn lookup(&self, id: FrameId) -> Result<FrameRef, RegistryError> {
        let mut state = self.state.lock();
        match state.frames.get(&id).cloned() {
            Some(weak) if weak.strong_count() > 0 => Ok(FrameRef::new(id, weak)),
            Some(_) => {
                // Released without being unregistered; drop the stale entry.
                state.frames.remove(&id);
                Err(RegistryError::NotFound(id))
            }
            None => Err(RegistryError::NotFound(id)),
        }
    }

    /// Lend the frame to `f` for the duration of the call.
    pub fn with_frame<R>(
        &self,
        id: FrameId,
        f: impl FnOnce(&Frame) -> R,
    ) -> Result<R, RegistryError> {
        self.lookup(id)?.with(f).ok_or(RegistryError::NotFound(id))
    }

    /// Remove an entry. Returns whether an entry was present.
    pub fn unregister(&self, id: FrameId) -> bool {
        let removed = self.state.lock().frames.remove(&id).is_some();
        if removed {
            debug!(frame_id = %id, "Unregistered frame");
        }
        removed
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.state
            .lock()
            .frames
            .get(&id)
            .map_or(false, |weak| weak.strong_count() > 0)
    }

    pub fn len(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids in allocation order
    pub fn ids(&self) -> Vec<FrameId> {
        self.state.lock().frames.keys().copied().collect()
    }
}
