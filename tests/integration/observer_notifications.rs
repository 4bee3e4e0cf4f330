//! Observer registration, removal and lifetime.

use super::test_utils::Recorder;
use pagehost::{BrowserContext, Frame, HostError, PageObserver};
use std::sync::Arc;

#[test]
fn test_duplicate_registration_notifies_twice() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let recorder = Recorder::new();
    let observer = recorder.as_observer();

    page.add_observer(&observer);
    page.add_observer(&observer);
    page.add_frame("child");

    assert_eq!(recorder.created_count(), 2);
    assert_eq!(page.observer_count(), 2);
}

#[test]
fn test_remove_observer_actually_shrinks_list() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let recorder = Recorder::new();
    let observer = recorder.as_observer();

    page.add_observer(&observer);
    assert!(page.remove_observer(&observer));
    assert_eq!(page.observer_count(), 0);

    page.add_frame("child");
    assert_eq!(recorder.created_count(), 0);
}

#[test]
fn test_remove_observer_twice_equals_once() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let kept = Recorder::new();
    let removed = Recorder::new();
    let removed_observer = removed.as_observer();

    page.add_observer(&kept.as_observer());
    page.add_observer(&removed_observer);

    assert!(page.remove_observer(&removed_observer));
    let after_once = page.observer_count();
    assert!(!page.remove_observer(&removed_observer));
    assert_eq!(page.observer_count(), after_once);
}

#[test]
fn test_remove_unknown_observer_is_noop() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let stranger = Recorder::new();

    assert!(!page.remove_observer(&stranger.as_observer()));
    assert_eq!(page.observer_count(), 0);
}

#[test]
fn test_dropped_observer_is_never_called() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let survivor = Recorder::new();

    {
        let transient = Recorder::new();
        page.add_observer(&transient.as_observer());
    }
    page.add_observer(&survivor.as_observer());
    assert_eq!(page.observer_count(), 2);

    page.add_frame("child");
    assert_eq!(survivor.created_count(), 1);
    assert_eq!(page.observer_count(), 1);
}

#[test]
fn test_registration_token_unregisters_on_drop() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let recorder = Recorder::new();
    let observer = recorder.as_observer();

    let registration = page.observe(&observer);
    page.add_frame("seen");
    drop(registration);
    page.add_frame("unseen");

    assert_eq!(recorder.created_count(), 1);
    assert_eq!(page.observer_count(), 0);
}

#[test]
fn test_registration_token_removes_only_its_entry() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let recorder = Recorder::new();
    let observer = recorder.as_observer();

    page.add_observer(&observer);
    let registration = page.observe(&observer);
    drop(registration);

    page.add_frame("child");
    assert_eq!(recorder.created_count(), 1);
}

#[test]
fn test_one_observer_many_pages() {
    let context = BrowserContext::new();
    let recorder = Recorder::new();
    let observer: Arc<dyn PageObserver> = recorder.as_observer();

    let a = context.create_page("a");
    let b = context.create_page("b");
    a.add_observer(&observer);
    b.add_observer(&observer);

    a.add_frame("a-child");
    b.add_frame("b-child");
    assert_eq!(recorder.created_count(), 2);

    drop(a);
    assert_eq!(recorder.destroyed_count(), 2);
    assert_eq!(b.observer_count(), 1);
}

struct Reentrant {
    context: BrowserContext,
    seen: parking_lot::Mutex<Vec<usize>>,
}

impl PageObserver for Reentrant {
    fn frame_created(&self, _frame: &pagehost::Frame) {
        let current = self.context.directory().current().unwrap();
        self.seen.lock().push(current.frame_count());
    }
}

#[test]
fn test_observer_may_query_context_during_callback() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let reentrant = Arc::new(Reentrant {
        context: context.clone(),
        seen: parking_lot::Mutex::new(Vec::new()),
    });
    let observer: Arc<dyn PageObserver> = reentrant.clone();
    page.add_observer(&observer);

    page.add_frame("child");
    assert_eq!(*reentrant.seen.lock(), vec![2]);
}

/// Tries to destroy the frame it is being told about, again.
struct Redestroyer {
    context: BrowserContext,
    destroyed: parking_lot::Mutex<Vec<pagehost::FrameId>>,
    nested: parking_lot::Mutex<Vec<Result<(), HostError>>>,
    nested_all: parking_lot::Mutex<Vec<Result<Vec<pagehost::FrameId>, HostError>>>,
}

impl Redestroyer {
    fn new(context: &BrowserContext) -> Arc<Self> {
        Arc::new(Self {
            context: context.clone(),
            destroyed: parking_lot::Mutex::new(Vec::new()),
            nested: parking_lot::Mutex::new(Vec::new()),
            nested_all: parking_lot::Mutex::new(Vec::new()),
        })
    }
}

impl PageObserver for Redestroyer {
    fn frame_destroyed(&self, frame: &Frame) {
        self.destroyed.lock().push(frame.id());
        let Some(page) = self.context.directory().find(frame.owner()) else {
            return;
        };
        let nested = page.destroy_frame(frame.id());
        self.nested.lock().push(nested);
        let nested_all = page.destroy_all_frames();
        self.nested_all.lock().push(nested_all);
    }
}

#[test]
fn test_destroy_from_destroy_callback_is_rejected() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let id = page.frame_ids()[0];
    let redestroyer = Redestroyer::new(&context);
    let observer: Arc<dyn PageObserver> = redestroyer.clone();
    page.add_observer(&observer);

    page.destroy_frame(id).unwrap();

    assert_eq!(*redestroyer.destroyed.lock(), vec![id]);
    let nested = redestroyer.nested.lock();
    assert!(matches!(nested[..], [Err(HostError::FrameDestroyed(f))] if f == id));
    let nested_all = redestroyer.nested_all.lock();
    assert!(matches!(nested_all[..], [Err(HostError::EmptyFrameSet(p))] if p == page.id()));
    assert_eq!(page.frame_count(), 0);
    assert!(!context.registry().contains(id));
}

#[test]
fn test_shutdown_with_reentrant_observer_notifies_once() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let id = page.frame_ids()[0];
    let redestroyer = Redestroyer::new(&context);
    let observer: Arc<dyn PageObserver> = redestroyer.clone();
    page.add_observer(&observer);

    let report = context.shutdown(id).unwrap();

    assert_eq!(report.released, vec![id]);
    assert_eq!(redestroyer.destroyed.lock().len(), 1);
    assert!(matches!(
        redestroyer.nested.lock()[..],
        [Err(HostError::FrameDestroyed(_))]
    ));
    assert_eq!(page.frame_count(), 0);
}

#[test]
fn test_destroy_all_with_reentrant_observer_leaves_siblings_alone() {
    let context = BrowserContext::new();
    let page = context.create_page("main");
    let first = page.frame_ids()[0];
    let second = page.add_frame("second");
    let redestroyer = Redestroyer::new(&context);
    let observer: Arc<dyn PageObserver> = redestroyer.clone();
    page.add_observer(&observer);

    let released = page.destroy_all_frames().unwrap();

    assert_eq!(released, vec![first, second]);
    assert_eq!(*redestroyer.destroyed.lock(), vec![first, second]);
    assert!(redestroyer
        .nested_all
        .lock()
        .iter()
        .all(|r| matches!(r, Err(HostError::EmptyFrameSet(_)))));
    assert!(context.registry().is_empty());
}
