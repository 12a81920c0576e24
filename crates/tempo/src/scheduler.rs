//! The scheduler: a virtual millisecond clock plus a pending-timer queue.
//!
//! # Determinism
//!
//! Timers that come due inside a single [`Scheduler::advance`] call fire in
//! (due time, timer id) order. Timer IDs are assigned monotonically, so two
//! timers armed for the same instant fire in the order they were scheduled.
//! Given the same schedule/cancel/advance sequence, two schedulers produce
//! identical firing sequences across runs and platforms.
//!
//! # Re-arming
//!
//! A repeating timer re-arms from the instant it was due, not from the end of
//! the advance that fired it. A frame longer than the interval therefore
//! fires the timer once per elapsed period instead of silently dropping
//! ticks.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{Repeat, TimerId};

/// A pending timer entry.
#[derive(Debug, Clone)]
struct Entry<T> {
    due: u64,
    repeat: Repeat,
    payload: T,
}

/// Deterministic timer queue over a virtual millisecond clock.
///
/// The clock only moves when the owner calls [`advance`](Self::advance) with
/// the elapsed frame time; the scheduler never consults wall time. Payloads
/// are plain data handed back to the caller on firing — dispatching them
/// (including any liveness or state re-checks) is the caller's job.
///
/// # Example
///
/// ```
/// use tempo::Scheduler;
///
/// let mut sched = Scheduler::new();
/// let id = sched.schedule(600, "crystallize");
///
/// let fired = sched.advance(600);
/// assert_eq!(fired, vec![(id, "crystallize")]);
/// assert!(sched.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    /// Virtual clock, milliseconds since construction.
    now: u64,
    /// Monotonically increasing timer id counter.
    next_id: u64,
    /// Pending timers keyed by id for O(log n) cancellation.
    timers: BTreeMap<TimerId, Entry<T>>,
}

impl<T: Clone> Scheduler<T> {
    /// Creates an empty scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            timers: BTreeMap::new(),
        }
    }

    /// Arms a one-shot timer that fires `delay` milliseconds from now.
    ///
    /// A `delay` of zero fires on the next [`advance`](Self::advance), never
    /// synchronously.
    pub fn schedule(&mut self, delay: u64, payload: T) -> TimerId {
        self.arm(delay, Repeat::Once, payload)
    }

    /// Arms a repeating timer that fires every `interval` milliseconds.
    ///
    /// The first firing is one full interval from now. An `interval` of zero
    /// is clamped to one millisecond so the timer cannot starve the queue.
    pub fn schedule_repeating(&mut self, interval: u64, payload: T) -> TimerId {
        let interval = interval.max(1);
        self.arm(interval, Repeat::Every(interval), payload)
    }

    fn arm(&mut self, delay: u64, repeat: Repeat, payload: T) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;

        let due = self.now + delay;
        trace!(timer = %id, due, ?repeat, "armed");
        self.timers.insert(
            id,
            Entry {
                due,
                repeat,
                payload,
            },
        );
        id
    }

    /// Cancels a pending timer.
    ///
    /// Returns `true` if the timer was still pending. Cancelling an id that
    /// already fired (one-shot) or was never issued is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.timers.remove(&id).is_some();
        if removed {
            trace!(timer = %id, "cancelled");
        }
        removed
    }

    /// Cancels every timer in `ids`.
    ///
    /// Entities that own several timers release them all in one call on
    /// destruction; unknown ids are skipped.
    pub fn cancel_all<I: IntoIterator<Item = TimerId>>(&mut self, ids: I) {
        for id in ids {
            self.cancel(id);
        }
    }

    /// Advances the clock by `dt` milliseconds and returns the timers that
    /// came due, in (due time, timer id) order.
    ///
    /// Repeating timers may appear more than once if `dt` spans several
    /// intervals; their payload is cloned per firing.
    pub fn advance(&mut self, dt: u64) -> Vec<(TimerId, T)> {
        self.now += dt;

        let mut fired = Vec::new();
        // One timer per iteration: re-armed repeats can come due again within
        // the same advance and must interleave with other timers correctly.
        loop {
            let next = self
                .timers
                .iter()
                .filter(|(_, e)| e.due <= self.now)
                .min_by_key(|(id, e)| (e.due, **id))
                .map(|(id, _)| *id);

            let Some(id) = next else { break };
            let Some(entry) = self.timers.get_mut(&id) else {
                break;
            };

            match entry.repeat {
                Repeat::Once => {
                    if let Some(entry) = self.timers.remove(&id) {
                        fired.push((id, entry.payload));
                    }
                }
                Repeat::Every(interval) => {
                    entry.due += interval;
                    let payload = entry.payload.clone();
                    fired.push((id, payload));
                }
            }
        }

        fired
    }

    /// Returns `true` if a timer with this id is still pending.
    #[must_use]
    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Returns the current virtual time in milliseconds.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
