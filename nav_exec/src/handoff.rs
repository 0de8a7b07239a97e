//! # Latest value handoff
//!
//! Hands the most recent value from exactly one producer thread to any number of readers. The
//! producer publishes whole values wrapped in an `Arc` and a reader takes a clone of that `Arc`,
//! so a reader can only ever see a complete value, never one being built.
//!
//! The lock is only held for the `Arc` swap or clone, never while a value is produced or used.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A published value along with its position in the publication sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Stamped<T> {
    /// Sequence number, 1 for the first publication.
    pub seq: u64,

    pub value: T,
}

/// Writing end of the handoff. Not `Clone`, so there is only ever one writer.
pub struct Publisher<T> {
    slot: Arc<Mutex<Option<Arc<Stamped<T>>>>>,
    seq: u64,
}

/// Reading end of the handoff.
pub struct Reader<T> {
    slot: Arc<Mutex<Option<Arc<Stamped<T>>>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

/// Create a new, empty, handoff.
pub fn handoff<T>() -> (Publisher<T>, Reader<T>) {
    let slot = Arc::new(Mutex::new(None));

    (
        Publisher {
            slot: slot.clone(),
            seq: 0,
        },
        Reader { slot },
    )
}

/// Lock the slot. A panic in another thread cannot leave a partial value in the slot, so a
/// poisoned lock is still safe to use.
fn lock<T>(slot: &Mutex<T>) -> MutexGuard<T> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T> Publisher<T> {
    /// Replace the current value, returning the sequence number it was given.
    pub fn publish(&mut self, value: T) -> u64 {
        self.seq += 1;

        let stamped = Arc::new(Stamped {
            seq: self.seq,
            value,
        });

        *lock(&self.slot) = Some(stamped);

        self.seq
    }
}

impl<T> Reader<T> {
    /// The most recently published value, or `None` if nothing has been published yet.
    pub fn latest(&self) -> Option<Arc<Stamped<T>>> {
        lock(&self.slot).clone()
    }
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_publish_latest() {
        let (mut tx, rx) = handoff::<Vec<u32>>();
        assert!(rx.latest().is_none());

        assert_eq!(tx.publish(vec![1, 2, 3]), 1);
        let first = rx.latest().unwrap();

        assert_eq!(tx.publish(vec![4]), 2);
        let second = rx.latest().unwrap();

        // Readers holding an old value keep it intact
        assert_eq!(first.seq, 1);
        assert_eq!(first.value, vec![1, 2, 3]);
        assert_eq!(second.seq, 2);
        assert_eq!(second.value, vec![4]);
    }

    #[test]
    fn test_readers_only_see_whole_values() {
        let (mut tx, rx) = handoff::<Vec<u64>>();

        let writer = thread::spawn(move || {
            for i in 0..1000u64 {
                tx.publish(vec![i; 64]);
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let rx = rx.clone();
                thread::spawn(move || {
                    let mut last_seq = 0;
                    for _ in 0..1000 {
                        if let Some(s) = rx.latest() {
                            // Every element was written by the same publication
                            assert!(s.value.iter().all(|v| *v == s.value[0]));
                            assert_eq!(s.value[0] + 1, s.seq);

                            // Never goes backwards
                            assert!(s.seq >= last_seq);
                            last_seq = s.seq;
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }

        assert_eq!(rx.latest().unwrap().seq, 1000);
    }
}
