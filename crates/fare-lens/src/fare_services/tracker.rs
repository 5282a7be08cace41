use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

/// Settled lookups kept per tracker before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 512;

/// Lifecycle of one remote lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LookupState<T> {
    Idle,
    Pending,
    Resolved(T),
    /// Sticky until the caller resets it.
    Failed(String),
}

/// What a caller should do after asking to start a lookup.
#[derive(Debug)]
pub enum Admission<'a, T> {
    /// The slot moved to `Pending`; the caller owns the request through the
    /// returned guard.
    Start(PendingSlot<'a, T>),
    InFlight,
    Cached(T),
    Failed(String),
}

#[derive(Debug)]
struct Slot<T> {
    state: LookupState<T>,
    generation: u64,
    touched: u64,
}

#[derive(Debug)]
struct Slots<T> {
    entries: HashMap<String, Slot<T>>,
    clock: u64,
}

impl<T> Slots<T> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drops least recently settled entries until a new key fits. Pending
    /// entries are never evicted.
    fn make_room(&mut self, capacity: usize) {
        while self.entries.len() >= capacity {
            let oldest = self
                .entries
                .iter()
                .filter(|(_, slot)| !matches!(slot.state, LookupState::Pending))
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    debug!(key = %key, capacity, "evicting settled lookup");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

/// Per-key request deduplication: at most one request in flight per key,
/// successes are cached, failures wait for a manual reset.
#[derive(Debug)]
pub struct RequestTracker<T> {
    slots: Mutex<Slots<T>>,
    capacity: usize,
}

impl<T> Default for RequestTracker<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T> RequestTracker<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Back to `Idle`, whatever the current state. Used for retry and dismiss.
    pub fn reset(&self, key: &str) {
        self.slots().entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.slots().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies the outcome of the request started at `generation`. A slot
    /// that was reset or restarted since then is left alone.
    fn settle(&self, key: &str, generation: u64, outcome: Option<LookupState<T>>) {
        let mut slots = self.slots();
        let current = slots
            .entries
            .get(key)
            .is_some_and(|slot| slot.generation == generation);
        if !current {
            return;
        }

        match outcome {
            Some(state) => {
                let touched = slots.tick();
                if let Some(slot) = slots.entries.get_mut(key) {
                    slot.state = state;
                    slot.touched = touched;
                }
            }
            None => {
                slots.entries.remove(key);
            }
        }
    }
}

impl<T: Clone> RequestTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, key: &str) -> Admission<'_, T> {
        let mut slots = self.slots();
        let known = match slots.entries.get(key).map(|slot| &slot.state) {
            Some(LookupState::Pending) => return Admission::InFlight,
            Some(LookupState::Resolved(value)) => return Admission::Cached(value.clone()),
            Some(LookupState::Failed(reason)) => return Admission::Failed(reason.clone()),
            Some(LookupState::Idle) => true,
            None => false,
        };
        if !known {
            slots.make_room(self.capacity);
        }

        let generation = slots.tick();
        slots.entries.insert(
            key.to_string(),
            Slot {
                state: LookupState::Pending,
                generation,
                touched: generation,
            },
        );

        Admission::Start(PendingSlot {
            tracker: self,
            key: key.to_string(),
            generation,
            settled: false,
        })
    }

    pub fn state(&self, key: &str) -> LookupState<T> {
        self.slots()
            .entries
            .get(key)
            .map(|slot| slot.state.clone())
            .unwrap_or(LookupState::Idle)
    }
}

/// Ownership of a `Pending` slot. Dropping it unsettled, for instance when the
/// request future is cancelled, returns the slot to `Idle`.
#[derive(Debug)]
pub struct PendingSlot<'a, T> {
    tracker: &'a RequestTracker<T>,
    key: String,
    generation: u64,
    settled: bool,
}

impl<T> PendingSlot<'_, T> {
    pub fn complete(mut self, value: T) {
        self.settle(Some(LookupState::Resolved(value)));
    }

    pub fn fail(mut self, reason: impl Into<String>) {
        self.settle(Some(LookupState::Failed(reason.into())));
    }

    /// Gives the slot back without recording an outcome.
    pub fn release(mut self) {
        self.settle(None);
    }

    fn settle(&mut self, outcome: Option<LookupState<T>>) {
        self.settled = true;
        self.tracker.settle(&self.key, self.generation, outcome);
    }
}

impl<T> Drop for PendingSlot<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            debug!(key = %self.key, "lookup abandoned before settling");
            self.settle(None);
        }
    }
}
