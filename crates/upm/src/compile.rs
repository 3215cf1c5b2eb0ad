//! The compilation pipeline: table rows to picoseconds to clocks to words.
//!
//! Three passes, run in order over a per-invocation scratch buffer (the
//! static tables are never written):
//!
//! 1. [`populate_times`] resolves each row's picosecond requirement for the
//!    target mode, applying board deltas, alternate-timing folds, group
//!    borrowing and predecessor subtraction.
//! 2. [`populate_clocks`] quantizes to bus clocks, balances half-cycle
//!    rows, and tops the pattern up to the minimum total cycle time.
//! 3. [`encode_rows`] emits the microcode words with REDO/LOOP compression.

use lbc::LocalBusTimings;

use crate::convert::ps_to_clocks;
use crate::inst::{redos, INST_LOOP, LOOP_COUNT, REDO_MAX_MULT, UPM_P_SIZE};
use crate::mode::PioMode;
use crate::table::{RowKind, TimingRow};

/// Errors produced while compiling a timing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompileError {
    /// The encoded pattern ran past the end of the 64-word program RAM.
    ///
    /// Cannot happen with the shipped tables; guards against future table
    /// edits that would silently corrupt a neighboring sub-pattern.
    ProgramOverflow,
}

/// Per-row compilation state, paired 1:1 with a [`TimingRow`].
///
/// Lives only for one compilation; never shared between invocations.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Timing {
    /// Resolved requirement in picoseconds (may go negative after
    /// subtractions; negative time is free).
    pub ps: i32,
    /// Assigned bus clocks.
    pub clk: i32,
}

/// Pass 1: resolve per-row picosecond requirements.
///
/// For each row in order: start from the mode's nanosecond value minus the
/// `clk_minus` correction, then apply the board deltas in a fixed order
/// (add cpuin_min, subtract cpuout_min, add cpuout_max, subtract
/// extdel_min, add extdel_max). Alternate rows fold into the previous
/// instruction, keeping the larger requirement. A row opening a group
/// lends its budget to the following `group_size` rows, whose quantized
/// cost is subtracted from it. `minus_prev` rows shed the clocks their
/// predecessor already covers.
pub(crate) fn populate_times(
    table: &[TimingRow],
    mode: PioMode,
    bus_period_ps: u32,
    deltas: &LocalBusTimings,
    timings: &mut [Timing],
) {
    let period = bus_period_ps as i32;
    let mut last: Option<usize> = None;
    let mut group: Option<usize> = None;
    let mut group_left = 0u32;

    for (i, row) in table.iter().enumerate() {
        let mut ps = row.ns[mode.index()] as i32 * 1000 - row.clk_minus as i32 * period;

        if row.opts.add_cpuin_min {
            ps += deltas.cpuin_min as i32;
        }
        if row.opts.sub_cpuout_min {
            ps -= deltas.cpuout_min as i32;
        }
        if row.opts.add_cpuout_max {
            ps += deltas.cpuout_max as i32;
        }
        if row.opts.sub_extdel_min {
            ps -= deltas.extdel_min as i32;
        }
        if row.opts.add_extdel_max {
            ps += deltas.extdel_max as i32;
        }

        match (last, row.kind) {
            (Some(l), RowKind::Alternate) => {
                // Folded rows contribute no instruction time of their own;
                // the previous instruction honors whichever requirement is
                // larger.
                if timings[l].ps < ps {
                    timings[l].ps = ps;
                }
                timings[i].ps = 0;
            }
            _ => {
                if row.group_size > 0 {
                    group = Some(i);
                    group_left = row.group_size;
                } else if let Some(g) = group {
                    if group_left > 0 {
                        let clk = ps_to_clocks(ps, bus_period_ps);
                        timings[g].ps -= clk * period;
                        group_left -= 1;
                    }
                }

                if row.opts.minus_prev {
                    if let Some(l) = last {
                        let clk = ps_to_clocks(timings[l].ps, bus_period_ps);
                        ps -= clk * period;
                    }
                }

                timings[i].ps = ps;
                last = Some(i);
            }
        }
    }
}

/// A row has a free half cycle when it owns at least two clocks and at
/// least half a bus period of quantization slack.
fn free_half(timing: &Timing, bus_period_ps: u32) -> bool {
    let period = bus_period_ps as i32;
    timing.clk >= 2 && (timing.clk * period - timing.ps) * 2 >= period
}

/// Pass 2: assign bus clocks.
///
/// Quantizes every row, then grants each interior half-cycle row one clock
/// stolen from each neighbor when both have slack (control lines the bus
/// samples mid-cycle need the extra edge margin), and finally pads
/// already-active rows round-robin until the pattern meets the sentinel's
/// minimum total cycle time.
pub(crate) fn populate_clocks(table: &[TimingRow], bus_period_ps: u32, timings: &mut [Timing]) {
    // Rows before the sentinel carry instruction time.
    let rows = table.len() - 1;
    let mut clk_total = 0i32;

    for t in timings.iter_mut().take(rows) {
        t.clk = ps_to_clocks(t.ps, bus_period_ps);
        clk_total += t.clk;
    }

    if rows >= 2 {
        for j in 1..rows - 1 {
            if table[j].opts.half_cycle
                && free_half(&timings[j - 1], bus_period_ps)
                && free_half(&timings[j + 1], bus_period_ps)
            {
                timings[j].clk += 1;
                timings[j - 1].clk -= 1;
                timings[j + 1].clk -= 1;
                // Each balance nets one clock fewer; the min-cycle top-up
                // below must see the real total.
                clk_total -= 1;
            }
        }
    }

    if table[rows].opts.min_cycle_time {
        timings[rows].clk = ps_to_clocks(timings[rows].ps, bus_period_ps);

        // Pad active rows round-robin up to the required total. A pattern
        // with no active rows has nothing to pad.
        if timings.iter().take(rows).any(|t| t.clk > 0) {
            let mut j = 0;
            while clk_total < timings[rows].clk {
                if j >= rows {
                    j = 0;
                }
                if timings[j].clk > 0 {
                    timings[j].clk += 1;
                    clk_total += 1;
                }
                j += 1;
            }
        }
    }
}

fn emit(words: &mut [u32; UPM_P_SIZE], pos: &mut usize, word: u32) -> Result<(), CompileError> {
    let slot = words.get_mut(*pos).ok_or(CompileError::ProgramOverflow)?;
    *slot = word;
    *pos += 1;
    Ok(())
}

/// Pass 3: encode clock counts as microcode words starting at `offset`.
///
/// A row holding eight or more clocks is split into two LOOP-flagged words
/// with near-equal REDO counts; the machine's loop field multiplies each
/// by [`LOOP_COUNT`]. Shorter runs emit one word with a REDO count of at
/// most [`REDO_MAX_MULT`]. Returns the position one past the final word.
pub(crate) fn encode_rows(
    table: &[TimingRow],
    timings: &[Timing],
    words: &mut [u32; UPM_P_SIZE],
    offset: usize,
) -> Result<usize, CompileError> {
    let mut pos = offset;

    for (row, timing) in table.iter().zip(timings) {
        let RowKind::Inst(value) = row.kind else {
            continue;
        };

        let mut clk = timing.clk;
        while clk > 0 {
            if clk >= LOOP_COUNT * 2 {
                let times = (clk / LOOP_COUNT).min(REDO_MAX_MULT * 2);
                let first = times / 2;
                let second = times - first;

                let looped = value | INST_LOOP;
                emit(words, &mut pos, looped | redos(first))?;
                emit(words, &mut pos, looped | redos(second))?;

                clk -= times * LOOP_COUNT;
            } else {
                let mult = clk.min(REDO_MAX_MULT);
                emit(words, &mut pos, value | redos(mult))?;
                clk -= mult;
            }
        }
    }

    Ok(pos)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inst::{INST_EMPTY, INST_REDO_2, INST_REDO_4};
    use crate::table::{RowOptions, READ_TABLE, WRITE_TABLE};

    const PERIOD: u32 = 15_037; // 66.5 MHz local bus

    fn mode(m: u8) -> PioMode {
        PioMode::try_new(m).unwrap()
    }

    fn scratch(table: &[TimingRow]) -> Vec<Timing> {
        vec![Timing::default(); table.len()]
    }

    fn quantize(table: &[TimingRow], m: u8, period: u32, deltas: &LocalBusTimings) -> Vec<Timing> {
        let mut timings = scratch(table);
        populate_times(table, mode(m), period, deltas, &mut timings);
        populate_clocks(table, period, &mut timings);
        timings
    }

    // Minimal synthetic table: one instruction plus the min-cycle sentinel.
    fn tiny_table(inst_ns: u32, min_cycle_ns: u32) -> [TimingRow; 2] {
        [
            TimingRow {
                kind: RowKind::Inst(0xAA00_0000),
                ns: [inst_ns; 7],
                clk_minus: 0,
                group_size: 0,
                opts: RowOptions::NONE,
            },
            TimingRow {
                kind: RowKind::End,
                ns: [min_cycle_ns; 7],
                clk_minus: 0,
                group_size: 0,
                opts: RowOptions::NONE.min_cycle_time(),
            },
        ]
    }

    #[test]
    fn tiny_table_quantizes_to_requirement() {
        let table = tiny_table(100, 50);
        let timings = quantize(&table, 0, 1000, &LocalBusTimings::default());
        // 100 ns = 100,000 ps on a 1000 ps clock → 100 clocks (2% tolerance
        // lands exactly on the boundary).
        assert_eq!(timings[0].clk, 100);
    }

    #[test]
    fn min_cycle_time_pads_active_rows() {
        // Instruction needs 10 clocks, pattern minimum demands 25.
        let table = tiny_table(10, 25);
        let timings = quantize(&table, 0, 1000, &LocalBusTimings::default());
        assert_eq!(timings[0].clk, 25);
    }

    #[test]
    fn min_cycle_with_no_active_rows_terminates() {
        let table = tiny_table(0, 25);
        let timings = quantize(&table, 0, 1000, &LocalBusTimings::default());
        // Nothing to pad; total stays zero rather than looping forever.
        assert_eq!(timings[0].clk, 0);
    }

    #[test]
    fn compiled_total_meets_min_cycle_for_every_mode() {
        for table in [&READ_TABLE[..], &WRITE_TABLE[..]] {
            for m in 0..=6u8 {
                let timings = quantize(table, m, PERIOD, &LocalBusTimings::default());
                let total: i32 = timings[..table.len() - 1].iter().map(|t| t.clk).sum();
                let sentinel = &table[table.len() - 1];
                let min_ps =
                    sentinel.ns[m as usize] as i32 * 1000 - sentinel.clk_minus as i32 * PERIOD as i32;
                assert!(
                    total * PERIOD as i32 >= min_ps,
                    "mode {m}: {total} clocks fall short of {min_ps} ps"
                );
            }
        }
    }

    #[test]
    fn alternate_rows_fold_into_predecessor() {
        // Read table: the t2i recovery requirement (70 ns at mode 3)
        // exceeds the t6Z row's own 30 ns and must win the fold.
        let table = &READ_TABLE;
        let mut timings = scratch(table);
        populate_times(table, mode(3), 1000, &LocalBusTimings::default(), &mut timings);

        // Folded rows never contribute time themselves.
        for (row, t) in table.iter().zip(&timings) {
            if matches!(row.kind, RowKind::Alternate) {
                assert_eq!(t.ps, 0);
            }
        }

        // t6Z row (index 7): the 70,000 ps − 2 clk alternate beats the
        // row's own 30,000 ps − 1 clk requirement, and the final
        // instruction row then borrows its one clock from the group the
        // t6Z row opened.
        assert_eq!(timings[7].ps, (70_000 - 2 * 1000) - 1000);
    }

    #[test]
    fn group_rows_borrow_from_owner() {
        // Read table t2 row (index 2) owns a group of 2: the WAEN and UTA
        // rows that follow bill their clocks against it.
        let table = &READ_TABLE;
        let mut timings = scratch(table);
        populate_times(table, mode(0), 10_000, &LocalBusTimings::default(), &mut timings);

        // t2 = 290,000 ps minus one clock each for WAEN (1 ns → 1 clk) and
        // UTA (1 ns → 1 clk).
        assert_eq!(timings[2].ps, 290_000 - 2 * 10_000);
    }

    #[test]
    fn half_cycle_steals_from_slack_neighbors() {
        // At mode 1 on a 15,037 ps clock both neighbors of the OE
        // half-phase row (t1 at 4 clocks, t2 at 18) quantize with more
        // than half a period of slack, so the row earns one clock from
        // each of them.
        let table = &READ_TABLE;
        let timings = quantize(table, 1, PERIOD, &LocalBusTimings::default());

        assert!(table[1].opts.half_cycle);
        assert_eq!(timings[1].clk, 1);
        assert_eq!(timings[0].clk, 3);
        assert_eq!(timings[2].clk, 17);
    }

    #[test]
    fn encoder_emits_single_word_for_short_runs() {
        let table = tiny_table(1, 0);
        let mut timings = scratch(&table);
        timings[0].clk = 3;

        let mut words = [INST_EMPTY; UPM_P_SIZE];
        let end = encode_rows(&table, &timings, &mut words, 0).unwrap();
        assert_eq!(end, 1);
        assert_eq!(words[0], 0xAA00_0000 | INST_REDO_2 * 2);
    }

    #[test]
    fn encoder_splits_long_runs_into_loop_pairs() {
        let table = tiny_table(1, 0);
        let mut timings = scratch(&table);
        timings[0].clk = 100;

        let mut words = [INST_EMPTY; UPM_P_SIZE];
        let end = encode_rows(&table, &timings, &mut words, 0).unwrap();

        // 100 clocks: 3 × (two LOOP words, 8 redos × 4 loops = 32 clocks)
        // consumes 96, then one REDO_4 word for the final 4.
        assert_eq!(end, 7);
        for w in &words[0..6] {
            assert_eq!(*w & INST_LOOP, INST_LOOP);
            assert_eq!(*w & INST_REDO_4, INST_REDO_4);
        }
        assert_eq!(words[6], 0xAA00_0000 | INST_REDO_4);
    }

    #[test]
    fn encoder_reports_overflow_instead_of_wrapping() {
        let table = tiny_table(1, 0);
        let mut timings = scratch(&table);
        timings[0].clk = 4;

        let mut words = [INST_EMPTY; UPM_P_SIZE];
        let err = encode_rows(&table, &timings, &mut words, UPM_P_SIZE);
        assert_eq!(err, Err(CompileError::ProgramOverflow));
    }
}
