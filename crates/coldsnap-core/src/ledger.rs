//! Session-scoped record of permanently unlocked narrative/puzzle gates.
//!
//! The ledger is append-only for the lifetime of a play session: there is no
//! revocation path in this design. Gated obstacles consult it (together with
//! the player's upgrade set) to decide whether they are already satisfied,
//! and it is mutated by collectible pickup and codec-fusion resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named unlock recorded in the [`Ledger`].
///
/// # Example
///
/// ```
/// use coldsnap_core::ledger::GateKey;
///
/// let key = GateKey::new("west-wing");
/// assert_eq!(key.as_str(), "west-wing");
/// assert_ne!(key, GateKey::main_exit());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GateKey(String);

impl GateKey {
    /// The distinguished key whose unlock also clears all plain doors in the
    /// active room (the narrative "main exit" unlock).
    pub const MAIN_EXIT: &'static str = "main-exit";

    /// Creates a key from a string.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Returns the distinguished main-exit key.
    #[must_use]
    pub fn main_exit() -> Self {
        Self::new(Self::MAIN_EXIT)
    }

    /// Returns `true` if this is the distinguished main-exit key.
    #[must_use]
    pub fn is_main_exit(&self) -> bool {
        self.0 == Self::MAIN_EXIT
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GateKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GateKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Monotonically growing set of unlock keys.
///
/// Persists across room transitions; only grows within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    unlocked: BTreeSet<GateKey>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an unlock. Returns `true` if the key was newly recorded.
    pub fn unlock(&mut self, key: GateKey) -> bool {
        self.unlocked.insert(key)
    }

    /// Returns `true` if the key has been unlocked this session.
    #[must_use]
    pub fn is_unlocked(&self, key: &GateKey) -> bool {
        self.unlocked.contains(key)
    }

    /// Returns the number of recorded unlocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    /// Returns `true` if nothing has been unlocked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// Iterates over unlocked keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &GateKey> + '_ {
        self.unlocked.iter()
    }
}
