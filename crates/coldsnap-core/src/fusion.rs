//! Codec-fusion rules.
//!
//! Collectible codec items fuse in pairs; each known pair resolves to one
//! world-level outcome. The pairing is order-insensitive and a pair of
//! identical codecs never fuses. Unknown pairs resolve to nothing, which the
//! host treats as a failed experiment rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::effect::Tint;

/// A collectible codec item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Codec {
    /// H.264 video codec.
    H264,
    /// AAC audio codec.
    Aac,
    /// VP9 video codec.
    Vp9,
    /// OGG audio codec.
    Ogg,
}

impl Codec {
    /// The pickup tint the host renders this codec with.
    #[must_use]
    pub const fn tint(self) -> Tint {
        match self {
            Self::H264 => Tint(0xff_aa_00),
            Self::Aac => Tint(0x00_aa_ff),
            Self::Vp9 => Tint(0x33_dd_33),
            Self::Ogg => Tint(0xaa_33_aa),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H264 => write!(f, "H264"),
            Self::Aac => write!(f, "AAC"),
            Self::Vp9 => write!(f, "VP9"),
            Self::Ogg => write!(f, "OGG"),
        }
    }
}

/// World-level result of fusing two codecs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionOutcome {
    /// Record the main-exit unlock key in the ledger.
    Unlock,
    /// Purely visual distortion; no state change.
    Hallucination,
    /// Activate the switch nearest the player.
    Switch,
    /// Power every elevator in the active room.
    Elevator,
    /// Clear all static hazards in the active room.
    Hazard,
}

/// Resolves a codec pair to its fusion outcome.
///
/// Order-insensitive; identical codecs and unknown pairings return `None`.
///
/// # Example
///
/// ```
/// use coldsnap_core::fusion::{fuse, Codec, FusionOutcome};
///
/// assert_eq!(fuse(Codec::H264, Codec::Aac), Some(FusionOutcome::Unlock));
/// assert_eq!(fuse(Codec::Aac, Codec::H264), Some(FusionOutcome::Unlock));
/// assert_eq!(fuse(Codec::Aac, Codec::Vp9), None);
/// ```
#[must_use]
pub fn fuse(a: Codec, b: Codec) -> Option<FusionOutcome> {
    use Codec::{Aac, Ogg, Vp9, H264};

    // Normalize so each pair appears once.
    let pair = if a <= b { (a, b) } else { (b, a) };
    match pair {
        (H264, Aac) => Some(FusionOutcome::Unlock),
        (Vp9, Ogg) => Some(FusionOutcome::Hallucination),
        (H264, Vp9) => Some(FusionOutcome::Switch),
        (Aac, Ogg) => Some(FusionOutcome::Elevator),
        (H264, Ogg) => Some(FusionOutcome::Hazard),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pairs_resolve() {
        assert_eq!(fuse(Codec::H264, Codec::Aac), Some(FusionOutcome::Unlock));
        assert_eq!(
            fuse(Codec::Vp9, Codec::Ogg),
            Some(FusionOutcome::Hallucination)
        );
        assert_eq!(fuse(Codec::H264, Codec::Vp9), Some(FusionOutcome::Switch));
        assert_eq!(fuse(Codec::Aac, Codec::Ogg), Some(FusionOutcome::Elevator));
        assert_eq!(fuse(Codec::H264, Codec::Ogg), Some(FusionOutcome::Hazard));
    }

    #[test]
    fn fusion_is_order_insensitive() {
        let pairs = [
            (Codec::H264, Codec::Aac),
            (Codec::Vp9, Codec::Ogg),
            (Codec::H264, Codec::Vp9),
            (Codec::Aac, Codec::Ogg),
            (Codec::H264, Codec::Ogg),
        ];
        for (a, b) in pairs {
            assert_eq!(fuse(a, b), fuse(b, a));
        }
    }

    #[test]
    fn identical_codecs_never_fuse() {
        for codec in [Codec::H264, Codec::Aac, Codec::Vp9, Codec::Ogg] {
            assert_eq!(fuse(codec, codec), None);
        }
    }

    #[test]
    fn unknown_pair_resolves_to_none() {
        assert_eq!(fuse(Codec::Aac, Codec::Vp9), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Codec::H264.to_string(), "H264");
        assert_eq!(Codec::Ogg.to_string(), "OGG");
    }
}
