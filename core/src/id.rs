//! High-water-mark id counter.
//!
//! # Design
//! One `IdCounter` lives for the whole process (the server keeps it in its
//! shared state). It only ever moves forward: `next_id` claims the value
//! after the mark, and `bump_if_higher` fast-forwards the mark when a client
//! supplies its own id. Both are single atomic operations, so concurrent
//! creates never receive the same generated id. Once the mark reaches
//! `i64::MAX` no further ids are generated.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Todo;

/// Process-wide source of todo ids.
#[derive(Debug, Default)]
pub struct IdCounter {
    current: AtomicI64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first generated id is `seed + 1`.
    pub fn starting_at(seed: i64) -> Self {
        Self {
            current: AtomicI64::new(seed),
        }
    }

    pub fn current(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Claim and return the next id, or `None` once the id space is used up.
    pub fn next_id(&self) -> Option<i64> {
        self.current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| current.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }

    /// Advance the mark to `observed` if it is higher.
    pub fn bump_if_higher(&self, observed: i64) {
        self.current.fetch_max(observed, Ordering::SeqCst);
    }

    /// Apply the creation rule to `todo`: id `0` gets a fresh id, any other id
    /// is kept and pushes the mark forward when it is ahead of it.
    ///
    /// Returns `None`, leaving `todo` untouched, when a fresh id is needed but
    /// none is left.
    pub fn assign(&self, todo: &mut Todo) -> Option<i64> {
        if todo.id == 0 {
            todo.id = self.next_id()?;
        } else {
            self.bump_if_higher(todo.id);
        }
        Some(todo.id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn first_id_is_one() {
        let ids = IdCounter::new();
        assert_eq!(ids.next_id(), Some(1));
        assert_eq!(ids.next_id(), Some(2));
        assert_eq!(ids.current(), 2);
    }

    #[test]
    fn seeded_counter_continues_after_seed() {
        let ids = IdCounter::starting_at(41);
        assert_eq!(ids.next_id(), Some(42));
    }

    #[test]
    fn higher_supplied_id_moves_mark() {
        let ids = IdCounter::new();
        let mut todo = Todo {
            id: 100,
            ..Todo::default()
        };
        assert_eq!(ids.assign(&mut todo), Some(100));
        assert_eq!(ids.next_id(), Some(101));
    }

    #[test]
    fn lower_supplied_id_is_kept_without_moving_mark() {
        let ids = IdCounter::starting_at(10);
        let mut todo = Todo {
            id: 3,
            ..Todo::default()
        };
        assert_eq!(ids.assign(&mut todo), Some(3));
        assert_eq!(ids.current(), 10);
    }

    #[test]
    fn zero_id_is_replaced() {
        let ids = IdCounter::starting_at(5);
        let mut todo = Todo::new("fresh");
        assert_eq!(ids.assign(&mut todo), Some(6));
        assert_eq!(todo.id, 6);
    }

    #[test]
    fn concurrent_next_id_never_repeats() {
        let ids = Arc::new(IdCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| ids.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8000);
        assert_eq!(ids.current(), 8000);
    }

    #[test]
    fn exhausted_counter_stops_generating() {
        let ids = IdCounter::starting_at(i64::MAX - 1);
        assert_eq!(ids.next_id(), Some(i64::MAX));
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.current(), i64::MAX);
    }

    #[test]
    fn supplied_max_id_is_kept_but_blocks_generation() {
        let ids = IdCounter::new();
        let mut pinned = Todo {
            id: i64::MAX,
            ..Todo::default()
        };
        assert_eq!(ids.assign(&mut pinned), Some(i64::MAX));

        let mut fresh = Todo::new("next");
        assert_eq!(ids.assign(&mut fresh), None);
        assert_eq!(fresh.id, 0);
    }

    #[test]
    fn bump_never_moves_backwards() {
        let ids = IdCounter::starting_at(50);
        ids.bump_if_higher(20);
        assert_eq!(ids.current(), 50);
        ids.bump_if_higher(70);
        assert_eq!(ids.current(), 70);
    }
}
