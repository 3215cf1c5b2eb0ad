//! Static ATA PIO timing tables.
//!
//! Each table is an ordered sequence of [`TimingRow`]s, one per microcode
//! instruction of the transfer pattern, terminated by exactly one
//! [`RowKind::End`] sentinel that carries the minimum total cycle time.
//! Nanosecond values are the ATA specification's abstract PIO timings
//! (t1, t2, t9, ...), one column per mode 0–6, independent of any board.
//!
//! Tables are process-wide constants and are never mutated; compilation
//! derives per-invocation state from them (see [`crate::compile`]).

use crate::inst::{
    INST_LAST, INST_N_CS, INST_N_CS_H2, INST_N_OE, INST_N_OE_H1, INST_N_WE, INST_N_WE_H1,
    INST_READ_BASE, INST_UTA, INST_WAEN, INST_WRITE_BASE,
};
use crate::mode::PioMode;

/// Number of PIO modes each row carries a timing for.
pub const PIO_MODE_COUNT: usize = PioMode::MAX as usize + 1;

/// What a table row contributes to the compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A microcode instruction with the given signal-level pattern.
    Inst(u32),
    /// No instruction of its own: an alternate timing requirement folded
    /// into the previous instruction (the larger of the two wins).
    Alternate,
    /// Table sentinel. Carries the minimum total cycle time for the whole
    /// pattern instead of an instruction duration.
    End,
}

/// Named per-row timing adjustments, applied in a fixed order.
///
/// The five delta flags select which board skew corrections
/// ([`lbc::LocalBusTimings`]) apply to the row's base requirement; each
/// field is either added or subtracted, never both. The remaining flags
/// steer the quantizer: `half_cycle` rows may steal a clock from their
/// neighbors, `minus_prev` rows exclude time already spent on their
/// predecessor, and `min_cycle_time` marks the sentinel's total-cycle
/// requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOptions {
    /// Add the CPU input setup minimum.
    pub add_cpuin_min: bool,
    /// Subtract the CPU output setup minimum.
    pub sub_cpuout_min: bool,
    /// Add the CPU output setup maximum.
    pub add_cpuout_max: bool,
    /// Subtract the external delay minimum.
    pub sub_extdel_min: bool,
    /// Add the external delay maximum.
    pub add_extdel_max: bool,
    /// Row models a control-line edge sampled mid-cycle; the quantizer may
    /// grant it a clock stolen from both neighbors.
    pub half_cycle: bool,
    /// Row duration excludes the clocks already paid by the previous row.
    pub minus_prev: bool,
    /// Sentinel-only: row value is the minimum total cycle time.
    pub min_cycle_time: bool,
}

impl RowOptions {
    /// No adjustments.
    pub const NONE: Self = Self {
        add_cpuin_min: false,
        sub_cpuout_min: false,
        add_cpuout_max: false,
        sub_extdel_min: false,
        add_extdel_max: false,
        half_cycle: false,
        minus_prev: false,
        min_cycle_time: false,
    };

    /// Add the CPU input setup minimum.
    #[must_use]
    pub const fn cpuin_min(self) -> Self {
        Self {
            add_cpuin_min: true,
            ..self
        }
    }

    /// Add the CPU output setup maximum.
    #[must_use]
    pub const fn cpuout_max(self) -> Self {
        Self {
            add_cpuout_max: true,
            ..self
        }
    }

    /// Apply the full CPU output delta: subtract the minimum, add the
    /// maximum (worst-case output window).
    #[must_use]
    pub const fn cpuout_delta(self) -> Self {
        Self {
            sub_cpuout_min: true,
            add_cpuout_max: true,
            ..self
        }
    }

    /// Subtract the external delay minimum.
    #[must_use]
    pub const fn extdel_min(self) -> Self {
        Self {
            sub_extdel_min: true,
            ..self
        }
    }

    /// Add the external delay maximum.
    #[must_use]
    pub const fn extdel_max(self) -> Self {
        Self {
            add_extdel_max: true,
            ..self
        }
    }

    /// Mark as a half-cycle row.
    #[must_use]
    pub const fn half_cycle(self) -> Self {
        Self {
            half_cycle: true,
            ..self
        }
    }

    /// Mark as excluding the predecessor's clocks.
    #[must_use]
    pub const fn minus_prev(self) -> Self {
        Self {
            minus_prev: true,
            ..self
        }
    }

    /// Mark as the minimum-total-cycle-time requirement.
    #[must_use]
    pub const fn min_cycle_time(self) -> Self {
        Self {
            min_cycle_time: true,
            ..self
        }
    }
}

/// One immutable timing-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRow {
    /// Instruction pattern, alternate-timing marker, or sentinel.
    pub kind: RowKind,
    /// Nanosecond requirement per PIO mode 0–6.
    pub ns: [u32; PIO_MODE_COUNT],
    /// Correction subtracted as whole bus clocks (requirement already
    /// partly covered by adjacent instructions).
    pub clk_minus: u32,
    /// When nonzero, this row's budget absorbs the computed cost of the
    /// next `group_size` instruction rows.
    pub group_size: u32,
    /// Adjustment flags.
    pub opts: RowOptions,
}

const fn inst(
    word: u32,
    ns: [u32; PIO_MODE_COUNT],
    clk_minus: u32,
    group_size: u32,
    opts: RowOptions,
) -> TimingRow {
    TimingRow {
        kind: RowKind::Inst(word),
        ns,
        clk_minus,
        group_size,
        opts,
    }
}

const fn alt(ns: [u32; PIO_MODE_COUNT], clk_minus: u32, opts: RowOptions) -> TimingRow {
    TimingRow {
        kind: RowKind::Alternate,
        ns,
        clk_minus,
        group_size: 0,
        opts,
    }
}

const fn end(ns: [u32; PIO_MODE_COUNT], clk_minus: u32) -> TimingRow {
    TimingRow {
        kind: RowKind::End,
        ns,
        clk_minus,
        group_size: 0,
        opts: RowOptions::NONE.min_cycle_time(),
    }
}

/// Read transfer pattern (IORD).
pub static READ_TABLE: [TimingRow; 12] = [
    // t1 - ADDR setup time
    inst(
        INST_READ_BASE | INST_N_OE,
        [70, 50, 30, 30, 25, 15, 10],
        0,
        0,
        RowOptions::NONE.cpuout_delta().extdel_max(),
    ),
    inst(
        INST_READ_BASE | INST_N_OE_H1,
        [0, 0, 0, 0, 0, 0, 0],
        0,
        0,
        RowOptions::NONE.half_cycle(),
    ),
    // t2 - OE0 time
    inst(
        INST_READ_BASE,
        [290, 290, 290, 80, 70, 65, 55],
        0,
        2,
        RowOptions::NONE.cpuout_max().cpuin_min(),
    ),
    inst(
        INST_READ_BASE | INST_WAEN,
        [1, 1, 1, 1, 1, 0, 0],
        0,
        0,
        RowOptions::NONE,
    ),
    inst(
        INST_READ_BASE | INST_UTA,
        [1, 1, 1, 1, 1, 1, 1],
        0,
        0,
        RowOptions::NONE,
    ),
    // t9 - ADDR hold time
    inst(
        INST_READ_BASE | INST_N_OE,
        [20, 15, 10, 10, 10, 10, 10],
        0,
        0,
        RowOptions::NONE.cpuout_delta().extdel_min(),
    ),
    inst(
        INST_READ_BASE | INST_N_OE | INST_N_CS_H2,
        [0, 0, 0, 0, 0, 0, 0],
        0,
        0,
        RowOptions::NONE.half_cycle(),
    ),
    // t6Z - IORD data tristate
    inst(
        INST_READ_BASE | INST_N_OE | INST_N_CS,
        [30, 30, 30, 30, 30, 20, 20],
        1,
        1,
        RowOptions::NONE.minus_prev(),
    ),
    // t2i - IORD recovery time
    alt([0, 0, 0, 70, 25, 25, 20], 2, RowOptions::NONE),
    // CS 0 -> 1 MAX
    alt(
        [0, 0, 0, 0, 0, 0, 0],
        1,
        RowOptions::NONE.cpuout_delta().extdel_max(),
    ),
    inst(
        INST_READ_BASE | INST_N_OE | INST_N_CS | INST_LAST,
        [1, 1, 1, 1, 1, 1, 1],
        0,
        0,
        RowOptions::NONE,
    ),
    // min total cycle time - includes turnaround and ALE cycle
    end([600, 383, 240, 180, 120, 100, 80], 2),
];

/// Write transfer pattern (IOWR).
pub static WRITE_TABLE: [TimingRow; 11] = [
    // t1 - ADDR setup time
    inst(
        INST_WRITE_BASE | INST_N_WE,
        [70, 50, 30, 30, 25, 15, 10],
        0,
        0,
        RowOptions::NONE.cpuout_delta().extdel_max(),
    ),
    inst(
        INST_WRITE_BASE | INST_N_WE_H1,
        [0, 0, 0, 0, 0, 0, 0],
        0,
        0,
        RowOptions::NONE.half_cycle(),
    ),
    // t2 - WE0 time
    inst(
        INST_WRITE_BASE,
        [290, 290, 290, 80, 70, 65, 55],
        0,
        1,
        RowOptions::NONE.cpuout_delta(),
    ),
    inst(
        INST_WRITE_BASE | INST_WAEN,
        [1, 1, 1, 1, 1, 0, 0],
        0,
        0,
        RowOptions::NONE,
    ),
    // t9 - ADDR hold time
    inst(
        INST_WRITE_BASE | INST_N_WE,
        [20, 15, 10, 10, 10, 10, 10],
        0,
        0,
        RowOptions::NONE.cpuout_delta().extdel_min(),
    ),
    inst(
        INST_WRITE_BASE | INST_N_WE | INST_N_CS_H2,
        [0, 0, 0, 0, 0, 0, 0],
        0,
        0,
        RowOptions::NONE.half_cycle(),
    ),
    // t4 - DATA hold time
    inst(
        INST_WRITE_BASE | INST_N_WE | INST_N_CS,
        [30, 20, 15, 10, 10, 10, 10],
        0,
        1,
        RowOptions::NONE.minus_prev(),
    ),
    // t2i - IOWR recovery time
    alt([0, 0, 0, 70, 25, 25, 20], 1, RowOptions::NONE),
    // CS 0 -> 1 MAX
    alt(
        [0, 0, 0, 0, 0, 0, 0],
        0,
        RowOptions::NONE.cpuout_delta().extdel_max(),
    ),
    inst(
        INST_WRITE_BASE | INST_N_WE | INST_N_CS | INST_UTA | INST_LAST,
        [1, 1, 1, 1, 1, 1, 1],
        0,
        0,
        RowOptions::NONE,
    ),
    // min total cycle time - includes ALE cycle
    end([600, 383, 240, 180, 120, 100, 80], 1),
];

/// Longest table length; sizes the per-compilation scratch buffer.
pub const MAX_TABLE_LEN: usize = READ_TABLE.len();

#[cfg(test)]
mod tests {
    use super::*;

    fn check_table(table: &[TimingRow]) {
        // Exactly one sentinel, and it is the final row.
        let sentinels = table
            .iter()
            .filter(|r| matches!(r.kind, RowKind::End))
            .count();
        assert_eq!(sentinels, 1);
        assert!(matches!(table[table.len() - 1].kind, RowKind::End));
        assert!(table[table.len() - 1].opts.min_cycle_time);

        // An alternate row must have a preceding instruction to fold into.
        assert!(!matches!(table[0].kind, RowKind::Alternate));

        // Groups must not reach past the sentinel.
        for (i, row) in table.iter().enumerate() {
            if row.group_size > 0 {
                assert!(i + row.group_size as usize + 1 < table.len());
            }
        }
    }

    #[test]
    fn read_table_is_well_formed() {
        check_table(&READ_TABLE);
    }

    #[test]
    fn write_table_is_well_formed() {
        check_table(&WRITE_TABLE);
    }

    #[test]
    fn timings_tighten_with_mode() {
        // The total-cycle sentinel must be strictly decreasing in mode.
        for table in [&READ_TABLE[..], &WRITE_TABLE[..]] {
            let sentinel = &table[table.len() - 1];
            for m in 1..PIO_MODE_COUNT {
                assert!(sentinel.ns[m] < sentinel.ns[m - 1]);
            }
        }
    }

    #[test]
    fn every_instruction_row_last_flag_is_final() {
        // Only the final instruction of each pattern carries INST_LAST.
        for table in [&READ_TABLE[..], &WRITE_TABLE[..]] {
            let mut last_seen = false;
            for row in table {
                if let RowKind::Inst(word) = row.kind {
                    assert!(!last_seen, "instruction after INST_LAST");
                    last_seen = word & crate::inst::INST_LAST != 0;
                }
            }
            assert!(last_seen, "pattern never terminates");
        }
    }

    #[test]
    fn scratch_buffer_covers_both_tables() {
        assert!(READ_TABLE.len() <= MAX_TABLE_LEN);
        assert!(WRITE_TABLE.len() <= MAX_TABLE_LEN);
    }
}
