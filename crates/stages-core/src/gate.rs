//! Gate flags: one byte per sample describing the gate level and its edges.
//!
//! The generator never sees raw gate voltages. The surrounding instrument
//! thresholds its gate input and turns the level stream into flags with
//! [`GateFlags::extract`], which marks the sample where the gate goes high
//! with [`GateFlags::RISING`] and the sample where it goes low with
//! [`GateFlags::FALLING`].
//!
//! ```rust
//! use stages_core::GateFlags;
//!
//! let mut flags = GateFlags::LOW;
//! flags = flags.extract(true);
//! assert!(flags.is_rising() && flags.is_high());
//! flags = flags.extract(true);
//! assert!(!flags.is_rising() && flags.is_high());
//! flags = flags.extract(false);
//! assert!(flags.is_falling() && !flags.is_high());
//! ```

use core::ops::{BitOr, BitOrAssign};

/// Gate level and edge bits for a single sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GateFlags(u8);

impl GateFlags {
    /// Gate is low, no edge.
    pub const LOW: Self = Self(0);
    /// Gate is high.
    pub const HIGH: Self = Self(1);
    /// Gate went high on this sample.
    pub const RISING: Self = Self(2);
    /// Gate went low on this sample.
    pub const FALLING: Self = Self(4);

    /// Build flags from raw bits. Unknown bits are dropped.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Gate level.
    #[inline]
    pub const fn is_high(self) -> bool {
        self.0 & Self::HIGH.0 != 0
    }

    /// Rising edge on this sample.
    #[inline]
    pub const fn is_rising(self) -> bool {
        self.0 & Self::RISING.0 != 0
    }

    /// Falling edge on this sample.
    #[inline]
    pub const fn is_falling(self) -> bool {
        self.0 & Self::FALLING.0 != 0
    }

    /// Derive the flags for the next sample from the previous flags and the
    /// current gate level.
    #[inline]
    #[must_use]
    pub const fn extract(self, high: bool) -> Self {
        let was_high = self.is_high();
        match (was_high, high) {
            (false, true) => Self(Self::HIGH.0 | Self::RISING.0),
            (true, true) => Self::HIGH,
            (true, false) => Self::FALLING,
            (false, false) => Self::LOW,
        }
    }
}

impl BitOr for GateFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for GateFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Fill `out` with the flags of a level stream, carrying edge state in
/// `previous` across blocks.
pub fn extract_gate_flags(previous: &mut GateFlags, levels: &[bool], out: &mut [GateFlags]) {
    debug_assert_eq!(levels.len(), out.len());
    for (flags, &level) in out.iter_mut().zip(levels) {
        *previous = previous.extract(level);
        *flags = *previous;
    }
}
