//! Picosecond to bus-clock quantization.

/// Convert a picosecond requirement to whole bus clocks.
///
/// Non-positive requirements are free and cost zero clocks. Positive
/// requirements round up to the next clock boundary, except that a
/// requirement no more than 2% past a boundary rounds down — capped at a
/// quarter of a clock so coarse clocks cannot shave off arbitrary time.
/// PIO timings carry enough margin for this, and without the tolerance a
/// requirement like 30,600 ps on a 10,000 ps clock would burn a fourth
/// clock for 600 ps of slack.
///
/// `bus_period_ps` must be nonzero; the configuration layer guarantees it.
#[must_use]
pub fn ps_to_clocks(ps: i32, bus_period_ps: u32) -> i32 {
    if ps <= 0 {
        return 0;
    }
    let period = bus_period_ps as i32;

    let mut over = ps * 2 / 100;
    if 4 * over > period {
        over = period / 4;
    }

    (ps + period - 1 - over) / period
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_requirements_are_free() {
        assert_eq!(ps_to_clocks(0, 10_000), 0);
        assert_eq!(ps_to_clocks(-1, 10_000), 0);
        assert_eq!(ps_to_clocks(i32::MIN, 10_000), 0);
    }

    #[test]
    fn exact_multiples_stay_exact() {
        assert_eq!(ps_to_clocks(10_000, 10_000), 1);
        assert_eq!(ps_to_clocks(30_000, 10_000), 3);
    }

    /// 2% over a boundary rounds down while the shave stays under a quarter
    /// clock.
    #[test]
    fn small_overshoot_rounds_down() {
        // 30,600 ps = 30,000 + 600; tolerance = 30,600 * 2% = 612 ≥ 600.
        assert_eq!(ps_to_clocks(30_600, 10_000), 3);
        // 30,700 ps: tolerance 614 < 700 over → rounds up.
        assert_eq!(ps_to_clocks(30_700, 10_000), 4);
    }

    /// The tolerance is clamped to a quarter clock: with a tiny period the
    /// 2% of a large requirement would otherwise swallow whole clocks.
    #[test]
    fn tolerance_clamps_at_quarter_period() {
        // ps = 130,300 on a 1000 ps clock: 2% = 2606, clamped to 250.
        // 130,300 − 250 → still above 130,000 → 131 clocks.
        assert_eq!(ps_to_clocks(130_300, 1000), 131);
        // 130,200: comes within the 250 ps clamp → 130 clocks.
        assert_eq!(ps_to_clocks(130_200, 1000), 130);
    }

    #[test]
    fn one_picosecond_needs_one_clock() {
        assert_eq!(ps_to_clocks(1, 10_000), 1);
    }

    #[test]
    fn monotone_in_requirement_around_boundaries() {
        let mut prev = 0;
        for ps in 0..50_000 {
            let clk = ps_to_clocks(ps, 7500);
            assert!(clk >= prev, "ps={ps} clk={clk} prev={prev}");
            prev = clk;
        }
    }
}
