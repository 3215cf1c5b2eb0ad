//! Property-based tests for the picosecond quantizer.
//! Verifies invariants hold across the input space, not just fixed examples.

use upm::convert::ps_to_clocks;

proptest::proptest! {
    /// Non-positive requirements are always free.
    #[test]
    fn non_positive_ps_is_zero_clocks(ps in i32::MIN..=0, period in 1u32..=1_000_000) {
        assert_eq!(ps_to_clocks(ps, period), 0);
    }

    /// Positive requirements always cost at least one clock.
    #[test]
    fn positive_ps_costs_at_least_one_clock(ps in 1i32..=10_000_000, period in 1u32..=1_000_000) {
        assert!(ps_to_clocks(ps, period) >= 1);
    }

    /// Monotone: more time required never costs fewer clocks.
    #[test]
    fn monotone_in_ps(ps in 0i32..=10_000_000, delta in 0i32..=100_000, period in 1u32..=1_000_000) {
        let lo = ps_to_clocks(ps, period);
        let hi = ps_to_clocks(ps + delta, period);
        assert!(hi >= lo, "ps_to_clocks({ps}+{delta}) = {hi} < {lo}");
    }

    /// The assigned clocks cover the requirement up to the rounding
    /// tolerance: at most 2% of the requirement, and never more than a
    /// quarter period.
    #[test]
    fn coverage_within_tolerance(ps in 1i32..=10_000_000, period in 4u32..=1_000_000) {
        let clk = ps_to_clocks(ps, period);
        let covered = i64::from(clk) * i64::from(period);
        let tolerance = i64::from(ps) * 2 / 100;
        let tolerance = tolerance.min(i64::from(period) / 4);
        assert!(
            covered >= i64::from(ps) - tolerance,
            "{clk} clocks x {period} ps leave {ps} ps uncovered beyond tolerance"
        );
    }

    /// Never over-allocates: one clock fewer would under-cover even after
    /// the tolerance shave.
    #[test]
    fn never_an_excess_clock(ps in 1i32..=10_000_000, period in 4u32..=1_000_000) {
        let clk = ps_to_clocks(ps, period);
        let under = i64::from(clk - 1) * i64::from(period);
        assert!(
            under < i64::from(ps),
            "{clk} clocks for {ps} ps at {period} ps/clk wastes a whole clock"
        );
    }
}
