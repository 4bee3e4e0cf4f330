//! Pages
//!
//! A page exclusively owns an ordered collection of frames and keeps a non-owning list
//! of observers. Every frame creation and destruction goes through the page so that
//! observers hear about it while the frame is still alive, and the frame registry
//! entry is gone before the frame itself is released.

pub mod directory;

pub use directory::PageDirectory;

use crate::context::BrowserContext;
use crate::error::HostError;
use crate::frame::Frame;
use crate::observer::{ObserverList, ObserverRegistration, PageObserver};
use crate::types::{FrameId, ObserverId, PageId};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info};

/// Page lifecycle. A page with zero frames is still `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLifecycle {
    Active,
    Destroyed,
}

/// Parameters for [`Page::create_with`]
#[derive(Clone)]
pub struct CreateParams {
    /// Name of the initial frame, also used as the page title
    pub main_frame_name: String,
    /// Observers registered before the initial frame is created
    pub observers: Vec<Arc<dyn PageObserver>>,
}

impl CreateParams {
    pub fn new(main_frame_name: impl Into<String>) -> Self {
        Self {
            main_frame_name: main_frame_name.into(),
            observers: Vec::new(),
        }
    }

    /// Register `observer` ahead of creation so it is told about the initial frame.
    pub fn with_observer(mut self, observer: Arc<dyn PageObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

struct PageState {
    lifecycle: PageLifecycle,
    frames: Vec<Arc<Frame>>,
    // Frames whose destruction has been announced but not yet completed.
    releasing: BTreeSet<FrameId>,
    observers: ObserverList,
}

impl PageState {
    /// Mark `frames` as releasing so nested destroy calls cannot select them again.
    fn claim(&mut self, frames: &[Arc<Frame>]) {
        self.releasing.extend(frames.iter().map(|f| f.id()));
    }

    fn releasable(&self) -> Vec<Arc<Frame>> {
        self.frames
            .iter()
            .filter(|f| !self.releasing.contains(&f.id()))
            .cloned()
            .collect()
    }
}

pub(crate) struct PageCore {
    id: PageId,
    title: String,
    context: BrowserContext,
    state: Mutex<PageState>,
}

impl PageCore {
    pub(crate) fn is_active(&self) -> bool {
        self.state.lock().lifecycle == PageLifecycle::Active
    }

    pub(crate) fn remove_observer_id(&self, id: ObserverId) -> bool {
        self.state.lock().observers.remove_id(id)
    }

    fn add_frame(&self, name: String) -> FrameId {
        let _guard = self.context.lifecycle_guard();
        let frame = self.context.registry().register(name, self.id);
        let observers = {
            let mut state = self.state.lock();
            state.frames.push(Arc::clone(&frame));
            state.observers.snapshot()
        };

        for observer in &observers {
            observer.frame_created(&frame);
        }
        debug!(page_id = %self.id, frame_id = %frame.id(), observers = observers.len(), "Added frame");
        frame.id()
    }

    fn destroy_frame(&self, frame_id: FrameId) -> Result<(), HostError> {
        let _guard = self.context.lifecycle_guard();
        let (frame, observers) = {
            let mut state = self.state.lock();
            let frame = state
                .frames
                .iter()
                .find(|f| f.id() == frame_id)
                .cloned()
                .ok_or(HostError::FrameNotOwned {
                    frame: frame_id,
                    page: self.id,
                })?;
            if state.releasing.contains(&frame_id) {
                return Err(HostError::FrameDestroyed(frame_id));
            }
            state.claim(std::slice::from_ref(&frame));
            (frame, state.observers.snapshot())
        };

        self.release(vec![frame], &observers);
        Ok(())
    }

    fn destroy_all_frames(&self) -> Result<Vec<FrameId>, HostError> {
        let _guard = self.context.lifecycle_guard();
        let (frames, observers) = {
            let mut state = self.state.lock();
            let frames = state.releasable();
            if frames.is_empty() {
                return Err(HostError::EmptyFrameSet(self.id));
            }
            state.claim(&frames);
            (frames, state.observers.snapshot())
        };

        Ok(self.release(frames, &observers))
    }

    /// Notify, unregister, then drop ownership of each frame in order.
    ///
    /// Callers must hold the lifecycle guard, must not hold the state lock, and must
    /// have claimed every frame in `frames`.
    fn release(&self, frames: Vec<Arc<Frame>>, observers: &[Arc<dyn PageObserver>]) -> Vec<FrameId> {
        let mut released = Vec::with_capacity(frames.len());
        for frame in frames {
            for observer in observers {
                observer.frame_destroyed(&frame);
            }
            self.context.registry().unregister(frame.id());
            {
                let mut state = self.state.lock();
                state.frames.retain(|owned| !Arc::ptr_eq(owned, &frame));
                state.releasing.remove(&frame.id());
            }
            debug!(page_id = %self.id, frame_id = %frame.id(), observers = observers.len(), "Released frame");
            released.push(frame.id());
        }
        released
    }

    fn teardown(&self) {
        let _guard = self.context.lifecycle_guard();
        self.context.directory().remove(self.id);

        let (frames, observers) = {
            let mut state = self.state.lock();
            if state.lifecycle == PageLifecycle::Destroyed {
                return;
            }
            state.lifecycle = PageLifecycle::Destroyed;
            let observers = state.observers.snapshot();
            state.observers.clear();
            let frames = state.releasable();
            state.claim(&frames);
            (frames, observers)
        };

        let released = self.release(frames, &observers);
        info!(page_id = %self.id, released = released.len(), "Page torn down");
    }
}

/// Non-owning reference to a page.
///
/// Obtained from [`PageDirectory`] lookups or [`Page::page_ref`]. It does not keep the
/// page's frames alive: once the owning [`Page`] is dropped the reference sees a
/// `Destroyed` page with no frames.
#[derive(Clone)]
pub struct PageRef {
    core: Arc<PageCore>,
}

impl PageRef {
    pub(crate) fn from_core(core: Arc<PageCore>) -> Self {
        Self { core }
    }

    pub fn id(&self) -> PageId {
        self.core.id
    }

    pub fn get_title(&self) -> &str {
        &self.core.title
    }

    pub fn context(&self) -> &BrowserContext {
        &self.core.context
    }

    pub fn lifecycle(&self) -> PageLifecycle {
        self.core.state.lock().lifecycle
    }

    /// Owned frame ids, oldest first
    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.core.state.lock().frames.iter().map(|f| f.id()).collect()
    }

    pub fn frame_count(&self) -> usize {
        self.core.state.lock().frames.len()
    }

    pub fn owns_frame(&self, frame_id: FrameId) -> bool {
        self.core
            .state
            .lock()
            .frames
            .iter()
            .any(|f| f.id() == frame_id)
    }

    /// Whether `frame_id` is being destroyed right now. Only observable from inside
    /// a `frame_destroyed` callback.
    pub fn is_releasing(&self, frame_id: FrameId) -> bool {
        self.core.state.lock().releasing.contains(&frame_id)
    }

    pub(crate) fn has_releasable_frames(&self) -> bool {
        !self.core.state.lock().releasable().is_empty()
    }

    /// Number of registered entries, duplicates included
    pub fn observer_count(&self) -> usize {
        self.core.state.lock().observers.len()
    }

    /// Append `observer` to the notification list.
    ///
    /// Registering the same observer twice is allowed and results in two
    /// notifications per event. The page keeps only a weak reference.
    pub fn add_observer(&self, observer: &Arc<dyn PageObserver>) -> ObserverId {
        self.core.state.lock().observers.push(observer)
    }

    /// Register `observer` and return a token that unregisters it on drop.
    pub fn observe(&self, observer: &Arc<dyn PageObserver>) -> ObserverRegistration {
        let id = self.add_observer(observer);
        ObserverRegistration::new(Arc::downgrade(&self.core), id)
    }

    /// Remove the first entry for `observer`. Removing an unknown observer is a no-op.
    pub fn remove_observer(&self, observer: &Arc<dyn PageObserver>) -> bool {
        self.core.state.lock().observers.remove_first(observer)
    }

    /// Destroy every owned frame, oldest first.
    ///
    /// For each frame, all observers get `frame_destroyed` before the frame is
    /// unregistered and released. Fails with `EmptyFrameSet` when nothing is owned.
    pub fn destroy_all_frames(&self) -> Result<Vec<FrameId>, HostError> {
        self.core.destroy_all_frames()
    }

    /// Destroy one owned frame with the same notification protocol.
    pub fn destroy_frame(&self, frame_id: FrameId) -> Result<(), HostError> {
        self.core.destroy_frame(frame_id)
    }
}

/// Owning handle to a page.
///
/// Dropping it tears the page down: the page leaves the directory, every remaining
/// frame is announced as destroyed, unregistered and released, and the observer list
/// is cleared.
pub struct Page {
    inner: PageRef,
}

impl Page {
    /// Create a page whose initial frame is named `title`.
    ///
    /// Observers added afterwards are not told about the initial frame; use
    /// [`Page::create_with`] to register them up front.
    pub fn create(context: &BrowserContext, title: impl Into<String>) -> Page {
        Self::create_with(context, CreateParams::new(title))
    }

    pub fn create_with(context: &BrowserContext, params: CreateParams) -> Page {
        let _guard = context.lifecycle_guard();
        let id = context.allocate_page_id();
        let frame = context
            .registry()
            .register(params.main_frame_name.clone(), id);

        let mut observers = ObserverList::default();
        for observer in &params.observers {
            observers.push(observer);
        }

        let core = Arc::new(PageCore {
            id,
            title: params.main_frame_name,
            context: context.clone(),
            state: Mutex::new(PageState {
                lifecycle: PageLifecycle::Active,
                frames: vec![Arc::clone(&frame)],
                releasing: BTreeSet::new(),
                observers,
            }),
        });
        context.directory().insert(id, Arc::downgrade(&core));

        let live = core.state.lock().observers.snapshot();
        for observer in &live {
            observer.frame_created(&frame);
        }

        info!(page_id = %id, frame_id = %frame.id(), title = %core.title, "Created page");
        Page {
            inner: PageRef::from_core(core),
        }
    }

    /// Create and register a new frame, notifying observers.
    pub fn add_frame(&self, name: impl Into<String>) -> FrameId {
        self.inner.core.add_frame(name.into())
    }

    pub fn page_ref(&self) -> PageRef {
        self.inner.clone()
    }
}

impl Deref for Page {
    type Target = PageRef;

    fn deref(&self) -> &PageRef {
        &self.inner
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.inner.core.teardown();
    }
}
