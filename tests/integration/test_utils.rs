//! Shared test utilities for integration tests

use pagehost::{BrowserContext, Frame, FrameId, PageObserver};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(FrameId, String),
    Destroyed(FrameId, String),
}

/// Observer that records every notification it receives.
///
/// When constructed with a context, `frame_destroyed` also records whether the
/// frame was still alive at the time, which the destroy protocol guarantees.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    context: Option<BrowserContext>,
    destroyed_while_page_owned: Mutex<Vec<bool>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn watching(context: &BrowserContext) -> Arc<Self> {
        Arc::new(Self {
            context: Some(context.clone()),
            ..Self::default()
        })
    }

    pub fn as_observer(self: &Arc<Self>) -> Arc<dyn PageObserver> {
        self.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn created_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Created(..)))
            .count()
    }

    pub fn destroyed_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Destroyed(..)))
            .count()
    }

    pub fn destroyed_while_page_owned(&self) -> Vec<bool> {
        self.destroyed_while_page_owned.lock().clone()
    }
}

impl PageObserver for Recorder {
    fn frame_created(&self, frame: &Frame) {
        self.events
            .lock()
            .push(Event::Created(frame.id(), frame.name().to_string()));
    }

    fn frame_destroyed(&self, frame: &Frame) {
        self.events
            .lock()
            .push(Event::Destroyed(frame.id(), frame.name().to_string()));
        if let Some(context) = &self.context {
            let owned = context
                .directory()
                .find(frame.owner())
                .map_or(false, |page| page.owns_frame(frame.id()));
            self.destroyed_while_page_owned.lock().push(owned);
        }
    }
}
