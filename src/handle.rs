//! Lifetime-checked frame handles.

use crate::error::HostError;
use crate::frame::Frame;
use crate::observer::{ObserverRegistration, PageObserver};
use crate::page::Page;
use crate::types::FrameId;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use tracing::debug;

struct FrameLiveness {
    frame_id: FrameId,
    frame: Mutex<Weak<Frame>>,
}

impl PageObserver for FrameLiveness {
    fn frame_destroyed(&self, frame: &Frame) {
        if frame.id() == self.frame_id {
            *self.frame.lock() = Weak::new();
            debug!(frame_id = %self.frame_id, "Handle observed frame destruction");
        }
    }
}

/// A memory-safe handle to one frame of a page.
///
/// The handle borrows the owning [`Page`], so it cannot outlive it. It holds only a
/// weak reference to the frame and registers an observer with the page, so once
/// the frame is destroyed (directly, through a shutdown, or by page teardown) the
/// handle reports it as gone instead of dangling. Dropping the handle unregisters
/// its observer.
///
/// Each access performs a liveness check. Batch repeated reads into one
/// [`FrameHandle::with`] call.
pub struct FrameHandle<'p> {
    frame_id: FrameId,
    liveness: Arc<FrameLiveness>,
    _registration: ObserverRegistration,
    _page: PhantomData<&'p Page>,
}

impl<'p> FrameHandle<'p> {
    /// Create a handle for `frame_id`, which must belong to `page`.
    pub fn from_id(page: &'p Page, frame_id: FrameId) -> Result<Self, HostError> {
        let frame = page
            .context()
            .registry()
            .lookup(frame_id)
            .map_err(|_| HostError::FrameNotFound(frame_id))?;
        let owner = frame
            .with(|f| f.owner())
            .ok_or(HostError::FrameNotFound(frame_id))?;
        if owner != page.id() {
            return Err(HostError::FrameNotOwned {
                frame: frame_id,
                page: page.id(),
            });
        }

        let liveness = Arc::new(FrameLiveness {
            frame_id,
            frame: Mutex::new(frame.downgrade()),
        });
        let observer: Arc<dyn PageObserver> = liveness.clone();
        let registration = page.observe(&observer);

        Ok(Self {
            frame_id,
            liveness,
            _registration: registration,
            _page: PhantomData,
        })
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Run `f` against the frame, or return `None` if it was already destroyed.
    ///
    /// The frame is only lent for the call; the handle never keeps it alive.
    pub fn with<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        let frame = self.liveness.frame.lock().upgrade()?;
        Some(f(&frame))
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.frame.lock().strong_count() > 0
    }

    pub fn name(&self) -> Result<String, HostError> {
        self.with(|frame| frame.name().to_string())
            .ok_or(HostError::FrameDestroyed(self.frame_id))
    }
}
