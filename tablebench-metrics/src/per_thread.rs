use std::thread::ThreadId;

use dashmap::DashMap;

use crate::merge::Merge;

/// One accumulator per OS thread that touches it.
///
/// Pool workers fold their samples into the slot of the thread they are currently
/// running on; the owner merges every slot once all work has finished. Which unit of
/// work lands in which slot is irrelevant to the merged result.
#[derive(Debug)]
pub struct PerThread<T> {
    slots: DashMap<ThreadId, T>,
}

impl<T> Default for PerThread<T> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<T: Merge> PerThread<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the calling thread's accumulator, creating it on first use.
    pub fn with_local<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut slot = self
            .slots
            .entry(std::thread::current().id())
            .or_default();
        f(slot.value_mut())
    }

    pub fn merge_local(&self, item: &T) {
        self.with_local(|acc| acc.merge(item));
    }

    /// Number of threads that have contributed so far.
    pub fn threads(&self) -> usize {
        self.slots.len()
    }

    /// Merges every slot without taking ownership, for owners that may still share
    /// the accumulator with finished workers.
    pub fn merged(&self) -> T {
        let mut acc = T::default();
        for slot in self.slots.iter() {
            acc.merge(slot.value());
        }
        acc
    }

    pub fn into_merged(self) -> T {
        let mut acc = T::default();
        for (_, slot) in self.slots {
            acc.merge(&slot);
        }
        acc
    }
}
