//! Page observers
//!
//! Observers are registered with a page by non-owning reference. The page never keeps
//! an observer alive: entries whose observer has been dropped are skipped and pruned
//! on the next notification.

use crate::frame::Frame;
use crate::page::PageCore;
use crate::types::ObserverId;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Receives frame lifecycle notifications from a page.
///
/// Callbacks run synchronously on the thread that created or destroyed the frame.
/// `frame_destroyed` runs while the frame is still alive.
pub trait PageObserver: Send + Sync {
    fn frame_created(&self, _frame: &Frame) {}

    fn frame_destroyed(&self, _frame: &Frame) {}
}

struct ObserverEntry {
    id: ObserverId,
    observer: Weak<dyn PageObserver>,
}

impl ObserverEntry {
    fn refers_to(&self, observer: &Arc<dyn PageObserver>) -> bool {
        self.observer
            .upgrade()
            .map_or(false, |live| Arc::ptr_eq(&live, observer))
    }
}

/// Ordered observer list owned by one page.
///
/// Duplicates are kept: an observer registered twice is notified twice.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<ObserverEntry>,
}

impl ObserverList {
    pub(crate) fn push(&mut self, observer: &Arc<dyn PageObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push(ObserverEntry {
            id,
            observer: Arc::downgrade(observer),
        });
        debug!(observer_id = %id, entries = self.entries.len(), "Added observer");
        id
    }

    /// Remove the first entry referring to `observer`.
    pub(crate) fn remove_first(&mut self, observer: &Arc<dyn PageObserver>) -> bool {
        match self.entries.iter().position(|e| e.refers_to(observer)) {
            Some(index) => {
                let entry = self.entries.remove(index);
                debug!(observer_id = %entry.id, entries = self.entries.len(), "Removed observer");
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_id(&mut self, id: ObserverId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                debug!(observer_id = %id, entries = self.entries.len(), "Removed observer");
                true
            }
            None => false,
        }
    }

    /// Upgrade every live entry, pruning entries whose observer is gone.
    pub(crate) fn snapshot(&mut self) -> Vec<Arc<dyn PageObserver>> {
        let before = self.entries.len();
        let mut live = Vec::with_capacity(before);
        self.entries.retain(|entry| match entry.observer.upgrade() {
            Some(observer) => {
                live.push(observer);
                true
            }
            None => false,
        });
        if self.entries.len() != before {
            warn!(
                pruned = before - self.entries.len(),
                "Pruned observers dropped while still registered"
            );
        }
        live
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Registration token returned by [`crate::Page::observe`].
///
/// Dropping the token removes exactly the entry it created. Once the page has been
/// torn down the token is inert.
#[must_use = "dropping the registration immediately unregisters the observer"]
pub struct ObserverRegistration {
    page: Weak<PageCore>,
    id: ObserverId,
}

impl ObserverRegistration {
    pub(crate) fn new(page: Weak<PageCore>, id: ObserverId) -> Self {
        Self { page, id }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Whether the page this registration belongs to is still alive.
    pub fn is_attached(&self) -> bool {
        self.page
            .upgrade()
            .map_or(false, |page| page.is_active())
    }
}

impl Drop for ObserverRegistration {
    fn drop(&mut self) {
        if let Some(page) = self.page.upgrade() {
            page.remove_observer_id(self.id);
        }
    }
}
