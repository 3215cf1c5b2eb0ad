//! ATA PIO transfer mode newtype.

/// Error returned when a requested PIO mode is outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPioMode {
    /// The rejected mode number.
    pub mode: u8,
}

/// A PIO transfer mode, 0–6 inclusive.
///
/// Higher modes carry tighter timings and faster transfers. Wraps a `u8`
/// with the invariant `mode <= 6`; everything downstream of construction
/// can index the seven-entry timing columns without further checks, so an
/// out-of-range request is rejected here before any compilation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PioMode(u8);

impl PioMode {
    /// Highest PIO mode the timing tables describe.
    pub const MAX: u8 = 6;

    /// Create a `PioMode`, rejecting values above 6.
    pub const fn try_new(mode: u8) -> Result<Self, InvalidPioMode> {
        if mode > Self::MAX {
            Err(InvalidPioMode { mode })
        } else {
            Ok(Self(mode))
        }
    }

    /// Return the mode number (0–6).
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Column index into a seven-entry per-mode timing array.
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}
