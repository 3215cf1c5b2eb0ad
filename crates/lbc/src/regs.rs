//! MxMR / LCRR register field encodings.
//!
//! Reference: MPC8349E Reference Manual, Section 10 (Local Bus Controller),
//! MAMR/MBMR/MCMR register description. The three UPM mode registers share
//! one layout; which one applies depends on the machine assigned to the
//! chip-select, so everything here is machine-agnostic.

/// MxMR operation field mask (bits OP, 0x3000_0000).
///
/// Selects what the next dummy access to the machine's address range does:
/// execute the pattern normally, write `MDR` into the program RAM at the
/// current machine address, or read the program RAM back into `MDR`.
pub const MXMR_OP: u32 = 0x3000_0000;

/// MxMR operation: normal operation (run the programmed pattern).
pub const MXMR_OP_NORMAL: u32 = 0x0000_0000;

/// MxMR operation: write `MDR` to the program RAM word addressed by MAD.
///
/// Each dummy access stores one word and increments MAD.
pub const MXMR_OP_WRITE_ARRAY: u32 = 0x1000_0000;

/// MxMR operation: read the program RAM word addressed by MAD into `MDR`.
pub const MXMR_OP_READ_ARRAY: u32 = 0x2000_0000;

/// MxMR operation: run pattern regardless of chip-select (diagnostics).
pub const MXMR_OP_RUN_PATTERN: u32 = 0x3000_0000;

/// MxMR machine address counter mask (MAD, bits 0x0000_003F).
///
/// Read back after each program-RAM access to confirm the machine consumed
/// the word: after writing word `i`, MAD reads `i + 1` (mod 64).
pub const MXMR_MAD: u32 = 0x0000_003F;

/// MxMR read loop field shift (RLF).
///
/// Number of times a LOOP-flagged block repeats during read patterns.
pub const MXMR_RLF_SHIFT: u32 = 14;

/// MxMR write loop field shift (WLF).
///
/// Number of times a LOOP-flagged block repeats during write patterns.
pub const MXMR_WLF_SHIFT: u32 = 10;

/// LCRR clock ratio field mask (CLKDIV).
///
/// The local bus clock is the system bus frequency divided by this field;
/// board support extracts it before deriving the bus period.
pub const LCRR_CLKDIV: u32 = 0x0000_001F;
