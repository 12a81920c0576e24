//! # Tempo
//!
//! Deterministic deferred-callback scheduler for frame-stepped game loops.
//!
//! Game hosts typically expose a "run this after N ms, optionally repeating"
//! facility whose callbacks fire from an opaque internal clock. Tempo replaces
//! that with an explicit, testable equivalent: timers carry a typed payload
//! instead of a closure, the clock is virtual and only moves when the host
//! calls [`Scheduler::advance`], and everything that fires inside one advance
//! comes back in a deterministic order.
//!
//! Because payloads are plain data, the owner of the scheduler decides what a
//! fired timer *means* — and can re-check entity liveness and state at
//! dispatch time, which is the discipline that keeps a timer from acting on
//! an entity that was destroyed after the timer was armed.
//!
//! ## Quick start
//!
//! ```
//! use tempo::Scheduler;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Ping {
//!     Thaw,
//!     Drip,
//! }
//!
//! let mut sched = Scheduler::new();
//! sched.schedule(2000, Ping::Thaw);
//! let drip = sched.schedule_repeating(500, Ping::Drip);
//!
//! // Nothing due yet.
//! assert!(sched.advance(100).is_empty());
//!
//! // One long frame can fire a repeating timer several times.
//! let fired = sched.advance(1900);
//! let payloads: Vec<_> = fired.into_iter().map(|(_, p)| p).collect();
//! assert_eq!(payloads, vec![Ping::Drip, Ping::Drip, Ping::Drip, Ping::Thaw]);
//!
//! // Cancelled timers never fire again.
//! assert!(sched.cancel(drip));
//! assert!(sched.advance(10_000).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod scheduler;

pub use scheduler::Scheduler;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a scheduled timer.
///
/// Timer IDs are assigned monotonically by a [`Scheduler`] and are never
/// reused within its lifetime, so a stale id held after cancellation or
/// expiry can at worst cancel nothing.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Creates a `TimerId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Re-arm behavior of a timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Fire once, then expire.
    Once,
    /// Fire every `interval` milliseconds until cancelled.
    Every(u64),
}
