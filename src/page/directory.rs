//! Page directory: resolves live pages by id and tracks the current page.
//!
//! Init/teardown rules: every `Page::create` inserts its page and makes it current.
//! When a page is torn down it leaves the directory; if it was current, the most
//! recently created surviving page becomes current, or there is none.

use crate::error::HostError;
use crate::frame::FrameRegistry;
use crate::page::{PageCore, PageRef};
use crate::types::{FrameId, PageId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Weak;
use tracing::debug;

pub struct PageDirectory {
    state: Mutex<DirectoryState>,
}

#[derive(Default)]
struct DirectoryState {
    pages: BTreeMap<PageId, Weak<PageCore>>,
    current: Option<PageId>,
}

impl Default for PageDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDirectory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DirectoryState::default()),
        }
    }

    pub(crate) fn insert(&self, id: PageId, page: Weak<PageCore>) {
        let mut state = self.state.lock();
        state.pages.insert(id, page);
        state.current = Some(id);
        debug!(page_id = %id, pages = state.pages.len(), "Page is now current");
    }

    pub(crate) fn remove(&self, id: PageId) -> bool {
        let mut state = self.state.lock();
        let removed = state.pages.remove(&id).is_some();
        if state.current == Some(id) {
            state.current = state.pages.keys().next_back().copied();
            debug!(page_id = %id, current = ?state.current, "Current page removed");
        }
        removed
    }

    /// The page external shutdown triggers act on
    pub fn current(&self) -> Result<PageRef, HostError> {
        let state = self.state.lock();
        state
            .current
            .and_then(|id| state.pages.get(&id))
            .and_then(Weak::upgrade)
            .map(PageRef::from_core)
            .ok_or(HostError::NoActivePage)
    }

    pub fn current_id(&self) -> Option<PageId> {
        self.state.lock().current
    }

    pub fn find(&self, id: PageId) -> Option<PageRef> {
        self.state
            .lock()
            .pages
            .get(&id)
            .and_then(Weak::upgrade)
            .map(PageRef::from_core)
    }

    /// Resolve the page owning `frame_id` through the frame registry.
    pub fn page_for_frame(
        &self,
        registry: &FrameRegistry,
        frame_id: FrameId,
    ) -> Result<PageRef, HostError> {
        let owner = registry
            .with_frame(frame_id, |frame| frame.owner())
            .map_err(|_| HostError::FrameNotFound(frame_id))?;
        self.find(owner).ok_or(HostError::NoActivePage)
    }

    pub fn ids(&self) -> Vec<PageId> {
        self.state.lock().pages.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
