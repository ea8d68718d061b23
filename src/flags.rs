//! Bitmask vocabulary shared by pattern specs and candidate atoms/bonds.
//!
//! Every property a pattern can constrain is a one-hot (or multi-bit) mask so
//! that "any of" and "none of" tests reduce to a single `&`. Patterns carry a
//! positive and a negative mask per property; candidates carry one.

use bitflags::bitflags;

bitflags! {
    /// Element identity.
    ///
    /// Common elements own a bit each. Everything else shares [`SYM`] and is
    /// told apart by the literal symbol stored next to the mask. The lone
    /// capitals `A E G J L M Q R T X Z` are generic wildcard codes, not
    /// elements.
    ///
    /// [`SYM`]: ElementMask::SYM
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ElementMask: u32 {
        const H = 0x0000_0001;
        const C = 0x0000_0002;
        const N = 0x0000_0004;
        const O = 0x0000_0008;
        /// Element matched by literal symbol.
        const SYM = 0x0000_0010;
        const S = 0x0000_0020;
        const P = 0x0000_0040;
        const F = 0x0000_0080;
        const CL = 0x0000_0100;
        const BR = 0x0000_0200;
        const I = 0x0000_0400;
        const NA = 0x0000_0800;
        const K = 0x0000_1000;
        const CA = 0x0000_2000;
        const MG = 0x0000_4000;
        const ZN = 0x0000_8000;
        const FE = 0x0001_0000;
        const CU = 0x0002_0000;
        const SE = 0x0004_0000;
        const B = 0x0008_0000;
        const A = 0x0010_0000;
        const E = 0x0020_0000;
        const G = 0x0040_0000;
        const J = 0x0080_0000;
        const L = 0x0100_0000;
        const M = 0x0200_0000;
        const Q = 0x0400_0000;
        const R = 0x0800_0000;
        const T = 0x1000_0000;
        const X = 0x2000_0000;
        const Z = 0x4000_0000;

        /// Any atom (`*`).
        const ANY = 0xFFFF_FFFF;
        /// Any atom except hydrogen (`?`).
        const NOT_H = 0xFFFF_FFFE;
    }
}

impl ElementMask {
    /// Mask a concrete element with the given symbol is described by.
    ///
    /// Elements without a bit of their own map to [`ElementMask::SYM`].
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "H" => Self::H,
            "C" => Self::C,
            "N" => Self::N,
            "O" => Self::O,
            "S" => Self::S,
            "P" => Self::P,
            "F" => Self::F,
            "Cl" => Self::CL,
            "Br" => Self::BR,
            "I" => Self::I,
            "Na" => Self::NA,
            "K" => Self::K,
            "Ca" => Self::CA,
            "Mg" => Self::MG,
            "Zn" => Self::ZN,
            "Fe" => Self::FE,
            "Cu" => Self::CU,
            "Se" => Self::SE,
            "B" => Self::B,
            _ => Self::SYM,
        }
    }
}

bitflags! {
    /// Chemical class of an atom or bond. `PI` is independent of the other two.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ClassMask: u32 {
        const ALIPHATIC = 0x1;
        const AROMATIC = 0x2;
        const ANY = 0x3;
        /// Member of a pi system.
        const PI = 0x4;
    }
}

bitflags! {
    /// Ring membership: acyclic, or the size of a ring the atom/bond is in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct RingMask: u32 {
        const ACYCLIC = 0x0000_0001;
        const RING3 = 0x0000_0002;
        const RING4 = 0x0000_0004;
        const RING5 = 0x0000_0008;
        const RING6 = 0x0000_0010;
        const RING7 = 0x0000_0020;
        const RING8 = 0x0000_0040;
        /// Ring larger than eight.
        const RING_N = 0x8000_0000;

        /// Sizes three through eight, set by a bare `r`.
        const SMALL_RINGS = 0x0000_007E;
        /// Any ring at all.
        const CYCLIC = 0xFFFF_FFFE;
    }
}

impl RingMask {
    /// Bit for a ring of `size` atoms. Sizes outside 3..=8 have no bit.
    pub fn from_ring_size(size: u8) -> Self {
        match size {
            3 => Self::RING3,
            4 => Self::RING4,
            5 => Self::RING5,
            6 => Self::RING6,
            7 => Self::RING7,
            8 => Self::RING8,
            _ => Self::empty(),
        }
    }
}

bitflags! {
    /// A small count (0..=8), used for both degree and valence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct CountMask: u32 {
        const N0 = 0x001;
        const N1 = 0x002;
        const N2 = 0x004;
        const N3 = 0x008;
        const N4 = 0x010;
        const N5 = 0x020;
        const N6 = 0x040;
        const N7 = 0x080;
        const N8 = 0x100;
    }
}

impl CountMask {
    /// Largest count with a bit of its own.
    pub const MAX: u8 = 8;

    pub fn from_count(count: u8) -> Option<Self> {
        if count > Self::MAX {
            return None;
        }
        Some(Self::from_bits_retain(1 << count))
    }
}

bitflags! {
    /// Formal charge, one bucket per value from -5 to +5.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ChargeMask: u32 {
        const NEUTRAL = 0x001;
        const CATION = 0x002;
        const DICATION = 0x004;
        const ANION = 0x008;
        const DIANION = 0x010;
        const TRICATION = 0x020;
        const TRIANION = 0x040;
        const TETCATION = 0x080;
        const TETANION = 0x100;
        const PENTCATION = 0x200;
        const PENTANION = 0x400;
    }
}

impl ChargeMask {
    /// Largest charge magnitude with a bucket.
    pub const MAX_MAGNITUDE: u8 = 5;

    const CATIONS: [ChargeMask; 6] = [
        Self::NEUTRAL,
        Self::CATION,
        Self::DICATION,
        Self::TRICATION,
        Self::TETCATION,
        Self::PENTCATION,
    ];

    const ANIONS: [ChargeMask; 6] = [
        Self::NEUTRAL,
        Self::ANION,
        Self::DIANION,
        Self::TRIANION,
        Self::TETANION,
        Self::PENTANION,
    ];

    /// Bucket for a charge of `+magnitude`.
    pub fn cation(magnitude: u8) -> Option<Self> {
        Self::CATIONS.get(magnitude as usize).copied()
    }

    /// Bucket for a charge of `-magnitude`.
    pub fn anion(magnitude: u8) -> Option<Self> {
        Self::ANIONS.get(magnitude as usize).copied()
    }

    /// Bucket for a signed formal charge; empty when out of range.
    pub fn from_formal_charge(charge: i8) -> Self {
        let magnitude = charge.unsigned_abs();
        let bucket = if charge < 0 {
            Self::anion(magnitude)
        } else {
            Self::cation(magnitude)
        };
        bucket.unwrap_or_else(Self::empty)
    }
}

bitflags! {
    /// Bond order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct OrderMask: u32 {
        const SINGLE = 0x1;
        const DOUBLE = 0x2;
        const TRIPLE = 0x4;
        const ANY = 0x7;
    }
}

/// `true` when a positive mask admits `have`: empty means unconstrained.
pub(crate) fn admits<T: bitflags::Flags>(want: T, have: T) -> bool {
    want.is_empty() || want.intersects(have)
}

/// `true` when a negative mask lets `have` through: empty means unconstrained.
pub(crate) fn excludes_none<T: bitflags::Flags>(forbid: T, have: T) -> bool {
    forbid.is_empty() || !forbid.intersects(have)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_covers_every_element_bit() {
        assert!(ElementMask::ANY.contains(ElementMask::H | ElementMask::Z | ElementMask::SYM));
        assert!(!ElementMask::NOT_H.contains(ElementMask::H));
        assert!(ElementMask::NOT_H.contains(ElementMask::C));
    }

    #[test]
    fn from_symbol_prefers_dedicated_bits() {
        assert_eq!(ElementMask::from_symbol("Cl"), ElementMask::CL);
        assert_eq!(ElementMask::from_symbol("Se"), ElementMask::SE);
        assert_eq!(ElementMask::from_symbol("Ac"), ElementMask::SYM);
        assert_eq!(ElementMask::from_symbol("U"), ElementMask::SYM);
    }

    #[test]
    fn ring_sizes() {
        assert_eq!(RingMask::from_ring_size(6), RingMask::RING6);
        assert!(RingMask::from_ring_size(2).is_empty());
        assert!(RingMask::from_ring_size(9).is_empty());
        assert_eq!(
            RingMask::SMALL_RINGS,
            RingMask::RING3
                | RingMask::RING4
                | RingMask::RING5
                | RingMask::RING6
                | RingMask::RING7
                | RingMask::RING8
        );
        assert!(!RingMask::CYCLIC.contains(RingMask::ACYCLIC));
    }

    #[test]
    fn counts() {
        assert_eq!(CountMask::from_count(0), Some(CountMask::N0));
        assert_eq!(CountMask::from_count(8), Some(CountMask::N8));
        assert_eq!(CountMask::from_count(9), None);
    }

    #[test]
    fn charges() {
        assert_eq!(ChargeMask::cation(3), Some(ChargeMask::TRICATION));
        assert_eq!(ChargeMask::anion(3), Some(ChargeMask::TRIANION));
        assert_eq!(ChargeMask::cation(0), Some(ChargeMask::NEUTRAL));
        assert_eq!(ChargeMask::anion(6), None);
        assert_eq!(ChargeMask::from_formal_charge(-2), ChargeMask::DIANION);
        assert_eq!(ChargeMask::from_formal_charge(0), ChargeMask::NEUTRAL);
        assert!(ChargeMask::from_formal_charge(7).is_empty());
    }

    #[test]
    fn admits_and_excludes() {
        assert!(admits(OrderMask::empty(), OrderMask::DOUBLE));
        assert!(admits(OrderMask::ANY, OrderMask::DOUBLE));
        assert!(!admits(OrderMask::SINGLE, OrderMask::DOUBLE));
        assert!(excludes_none(OrderMask::empty(), OrderMask::DOUBLE));
        assert!(!excludes_none(OrderMask::DOUBLE, OrderMask::DOUBLE));
        assert!(excludes_none(OrderMask::SINGLE, OrderMask::DOUBLE));
    }
}
