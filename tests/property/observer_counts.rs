//! Property-based tests for observer list bookkeeping

use pagehost::{BrowserContext, Frame, PageObserver};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counter {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

impl PageObserver for Counter {
    fn frame_created(&self, _frame: &Frame) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn frame_destroyed(&self, _frame: &Frame) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Add),
        (0usize..4).prop_map(Op::Remove),
    ]
}

proptest! {
    /// Notifications delivered on the next event equal the registered entry count,
    /// duplicates included.
    #[test]
    fn test_notifications_match_registered_entries(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let context = BrowserContext::new();
        let page = context.create_page("main");
        let counters: Vec<Arc<Counter>> = (0..4).map(|_| Arc::new(Counter::default())).collect();
        let observers: Vec<Arc<dyn PageObserver>> = counters
            .iter()
            .map(|c| c.clone() as Arc<dyn PageObserver>)
            .collect();
        let mut expected = [0usize; 4];

        for op in &ops {
            match *op {
                Op::Add(i) => {
                    page.add_observer(&observers[i]);
                    expected[i] += 1;
                }
                Op::Remove(i) => {
                    let removed = page.remove_observer(&observers[i]);
                    prop_assert_eq!(removed, expected[i] > 0);
                    expected[i] = expected[i].saturating_sub(1);
                }
            }
        }
        prop_assert_eq!(page.observer_count(), expected.iter().sum::<usize>());

        let child = page.add_frame("child");
        for (counter, count) in counters.iter().zip(expected.iter()) {
            prop_assert_eq!(counter.created.load(Ordering::SeqCst), *count);
        }

        page.destroy_frame(child).unwrap();
        for (counter, count) in counters.iter().zip(expected.iter()) {
            prop_assert_eq!(counter.destroyed.load(Ordering::SeqCst), *count);
        }
    }

    /// Frame ids are unique and the registry holds exactly the live frames.
    #[test]
    fn test_registry_tracks_live_frames(names in prop::collection::vec("[a-z]{0,8}", 0..20), destroy_every in 1usize..4) {
        let context = BrowserContext::new();
        let page = context.create_page("main");
        let mut ids = page.frame_ids();
        for name in &names {
            ids.push(page.add_frame(name.clone()));
        }

        let mut sorted = ids.clone();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), ids.len());

        for id in ids.iter().step_by(destroy_every) {
            page.destroy_frame(*id).unwrap();
        }
        prop_assert_eq!(context.registry().ids(), page.frame_ids());
    }
}
