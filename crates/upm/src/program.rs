//! The compiled 64-word microcode program.

use lbc::LocalBusTimings;

use crate::compile::{encode_rows, populate_clocks, populate_times, CompileError, Timing};
use crate::inst::{INST_EMPTY, UPM_P_RSS, UPM_P_SIZE, UPM_P_WSS};
use crate::mode::PioMode;
use crate::table::{TimingRow, MAX_TABLE_LEN, READ_TABLE, WRITE_TABLE};

/// One fully compiled UPM program.
///
/// Always exactly [`UPM_P_SIZE`] words: the read pattern at the
/// read-single-beat offset, the write pattern at the write-single-beat
/// offset, and the idle [`INST_EMPTY`] word everywhere else. Never
/// partially valid — compilation either fills a fresh program completely
/// or fails without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpmProgram {
    /// The program RAM image.
    pub words: [u32; UPM_P_SIZE],
    /// Chip-select window address the programming sequence strobes.
    pub io_addr: u32,
    /// Number of words in the read single-beat pattern.
    ///
    /// A pattern's terminator can be bit-identical to the idle
    /// [`INST_EMPTY`] word (a read terminator with a REDO count of 1 is
    /// exactly that), so pattern extent cannot be recovered by scanning
    /// the RAM image; only the encoder knows where a pattern ends.
    pub read_len: usize,
    /// Number of words in the write single-beat pattern.
    pub write_len: usize,
}

impl UpmProgram {
    fn empty(io_addr: u32) -> Self {
        Self {
            words: [INST_EMPTY; UPM_P_SIZE],
            io_addr,
            read_len: 0,
            write_len: 0,
        }
    }
}

/// Compile one timing table into `program` starting at `offset`.
///
/// Derives a fresh scratch buffer per invocation; `table` is only read.
/// Returns the number of words the pattern occupies.
fn compile_table(
    program: &mut UpmProgram,
    table: &[TimingRow],
    mode: PioMode,
    bus_period_ps: u32,
    deltas: &LocalBusTimings,
    offset: usize,
) -> Result<usize, CompileError> {
    let mut timings = [Timing::default(); MAX_TABLE_LEN];
    let timings = &mut timings[..table.len()];

    populate_times(table, mode, bus_period_ps, deltas, timings);
    populate_clocks(table, bus_period_ps, timings);
    let end = encode_rows(table, timings, &mut program.words, offset)?;

    Ok(end - offset)
}

/// Compile the full PIO program for `mode`.
///
/// `bus_period_ps` is the local bus clock period from
/// [`lbc::bus_period_ps`]; `deltas` the board skew corrections; `io_addr`
/// the chip-select window address later used to clock the words in.
/// Deterministic: identical inputs produce identical programs.
///
/// # Errors
///
/// [`CompileError::ProgramOverflow`] if an encoded pattern would run past
/// the 64-word RAM (not reachable with the built-in tables).
pub fn compile_program(
    mode: PioMode,
    bus_period_ps: u32,
    deltas: &LocalBusTimings,
    io_addr: u32,
) -> Result<UpmProgram, CompileError> {
    let mut program = UpmProgram::empty(io_addr);

    program.read_len = compile_table(
        &mut program,
        &READ_TABLE,
        mode,
        bus_period_ps,
        deltas,
        UPM_P_RSS,
    )?;
    program.write_len = compile_table(
        &mut program,
        &WRITE_TABLE,
        mode,
        bus_period_ps,
        deltas,
        UPM_P_WSS,
    )?;

    Ok(program)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
