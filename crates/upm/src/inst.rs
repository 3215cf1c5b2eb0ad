//! UPM instruction word encoding.
//!
//! Reference: MPC8349E Reference Manual, Section 10.4.4 (UPM programming).
//! One 32-bit RAM word describes the level of every controlled signal for
//! one bus clock, split into quarter phases, plus flow control (REDO
//! repeat counts, LOOP block markers, transfer acknowledge, end of
//! pattern). Signal fields are active-low: a set bit keeps the line
//! negated for that phase.

/// General-purpose line 0 negated, first half phase (base for every word).
pub const INST_N_BASE: u32 = 0x00F0_0000;

/// Chip-select timing mask (LCSn, all four quarter phases).
pub const INST_N_CS: u32 = 0xF000_0000;
/// Chip-select negated during the first half phase (CST1/2).
pub const INST_N_CS_H1: u32 = 0xC000_0000;
/// Chip-select negated during the second half phase (CST3/4).
pub const INST_N_CS_H2: u32 = 0x3000_0000;

/// Byte-select (write-enable) timing mask (LBSn).
pub const INST_N_WE: u32 = 0x0F00_0000;
/// Byte-select negated during the first half phase (BST1/2).
pub const INST_N_WE_H1: u32 = 0x0C00_0000;
/// Byte-select negated during the second half phase (BST3/4).
pub const INST_N_WE_H2: u32 = 0x0300_0000;

/// Output-enable timing mask (LGPL2 / G2).
pub const INST_N_OE: u32 = 0x0003_0000;
/// Output-enable negated during the first half phase (G2T1).
pub const INST_N_OE_H1: u32 = 0x0002_0000;
/// Output-enable negated during the second half phase (G2T3).
pub const INST_N_OE_H2: u32 = 0x0001_0000;

/// Enable LUPWAIT sampling (external wait-state request).
pub const INST_WAEN: u32 = 0x0000_1000;

/// REDO field: execute this word twice.
pub const INST_REDO_2: u32 = 0x0000_0100;
/// REDO field: execute this word three times.
pub const INST_REDO_3: u32 = 0x0000_0200;
/// REDO field: execute this word four times.
pub const INST_REDO_4: u32 = 0x0000_0300;

/// LOOP marker: the first flagged word starts a loop block, the next ends it.
///
/// The block repeats per the machine's read/write loop field.
pub const INST_LOOP: u32 = 0x0000_0080;

/// Next burst address.
pub const INST_NA: u32 = 0x0000_0008;
/// Transfer acknowledge.
pub const INST_UTA: u32 = 0x0000_0004;
/// End of pattern.
pub const INST_LAST: u32 = 0x0000_0001;

/// Base pattern for read words: write-enable held negated throughout.
pub const INST_READ_BASE: u32 = INST_N_BASE | INST_N_WE;
/// Base pattern for write words: output-enable held negated throughout.
pub const INST_WRITE_BASE: u32 = INST_N_BASE | INST_N_OE;
/// Idle word every untouched program RAM slot holds: everything negated,
/// pattern ends immediately.
pub const INST_EMPTY: u32 = INST_N_BASE | INST_N_CS | INST_N_OE | INST_N_WE | INST_LAST;

/// Highest clock multiplier one REDO field can express.
pub const REDO_MAX_MULT: i32 = 4;

/// Loop block repeat count programmed into the machine's RLF/WLF fields.
pub const LOOP_COUNT: i32 = 4;

/// Encode a REDO repeat count of `mult` (1 ≤ mult ≤ [`REDO_MAX_MULT`]).
#[must_use]
pub const fn redos(mult: i32) -> u32 {
    INST_REDO_2 * (mult as u32 - 1)
}

// ── Program RAM geometry ────────────────────────────────────────────────────

/// Program RAM offset of the read single-beat pattern.
pub const UPM_P_RSS: usize = 0x00;
/// Program RAM offset of the read burst pattern.
pub const UPM_P_RBS: usize = 0x08;
/// Program RAM offset of the write single-beat pattern.
pub const UPM_P_WSS: usize = 0x18;
/// Program RAM offset of the write burst pattern.
pub const UPM_P_WBS: usize = 0x20;
/// Program RAM offset of the refresh timer pattern.
pub const UPM_P_RTS: usize = 0x30;
/// Program RAM offset of the exception condition pattern.
pub const UPM_P_EXS: usize = 0x3C;
/// UPM program RAM is 64 32-bit words.
pub const UPM_P_SIZE: usize = 0x40;
