//! Board-specific local bus timing inputs.
//!
//! Two values arrive from board configuration before any microcode can be
//! compiled: the local bus clock period (derived from the SoC bus frequency
//! and the LCRR clock divider) and an optional five-value skew correction
//! property. Both are plain data here — this crate does not walk any
//! configuration tree, it only decodes the bytes the board support hands it.

/// Errors produced while deriving timing inputs from board configuration.
///
/// All of these are fatal to the owning adapter: without a bus period no
/// timing can ever be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The bus-frequency property was absent or zero.
    MissingBusFrequency,
    /// The LCRR clock divider field read as zero (reserved encoding).
    InvalidClockDivider,
}

/// Board-specific electrical skew corrections, in picoseconds.
///
/// These are added on top of the vendor-specified abstract PIO timings on a
/// per-instruction basis; which field applies to which instruction is
/// encoded in the timing tables. Boards without the configuration property
/// use the all-zero default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalBusTimings {
    /// Minimum CPU input setup (signal into the SoC).
    pub cpuin_min: u32,
    /// Minimum CPU output setup (signal leaving the SoC).
    pub cpuout_min: u32,
    /// Maximum CPU output setup.
    pub cpuout_max: u32,
    /// Minimum external propagation delay (board traces + buffers).
    pub extdel_min: u32,
    /// Maximum external propagation delay.
    pub extdel_max: u32,
}

impl LocalBusTimings {
    /// Number of bytes in a well-formed configuration property.
    pub const PROPERTY_LEN: usize = 5 * 4;

    /// Decode the five-value skew property.
    ///
    /// The property is five big-endian u32 picosecond values in the order
    /// `cpuin_min, cpuout_min, cpuout_max, extdel_min, extdel_max`. A
    /// property of any other length (including absent, passed as an empty
    /// slice) yields the all-zero default — boards without custom skew
    /// simply omit it.
    #[must_use]
    pub fn from_property(prop: &[u8]) -> Self {
        if prop.len() != Self::PROPERTY_LEN {
            return Self::default();
        }

        let mut fields = [0u32; 5];
        for (field, chunk) in fields.iter_mut().zip(prop.chunks_exact(4)) {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            *field = u32::from_be_bytes(word);
        }

        Self {
            cpuin_min: fields[0],
            cpuout_min: fields[1],
            cpuout_max: fields[2],
            extdel_min: fields[3],
            extdel_max: fields[4],
        }
    }
}

/// Derive the local bus clock period in picoseconds.
///
/// `bus_frequency_hz` is the SoC bus frequency from configuration;
/// `clkdiv` is the LCRR clock divider field. The local bus runs at
/// `bus_frequency_hz / clkdiv`, and the period follows as
/// `1_000_000_000 / (local_bus_hz / 1000)` picoseconds.
///
/// # Errors
///
/// [`ConfigError::MissingBusFrequency`] when the frequency is zero (or so
/// low that it has no whole-kHz representation);
/// [`ConfigError::InvalidClockDivider`] when `clkdiv` is zero.
pub fn bus_period_ps(bus_frequency_hz: u32, clkdiv: u32) -> Result<u32, ConfigError> {
    bus_period(bus_frequency_hz, clkdiv)
}

/// Derive the local bus clock period from a raw LCRR register value.
///
/// Masks the clock-divider field ([`crate::regs::LCRR_CLKDIV`]) out of
/// `lcrr` and defers to [`bus_period_ps`].
///
/// # Errors
///
/// Same as [`bus_period_ps`].
pub fn bus_period_from_lcrr(bus_frequency_hz: u32, lcrr: u32) -> Result<u32, ConfigError> {
    bus_period(bus_frequency_hz, lcrr & crate::regs::LCRR_CLKDIV)
}

fn bus_period(bus_frequency_hz: u32, clkdiv: u32) -> Result<u32, ConfigError> {
    if bus_frequency_hz == 0 {
        return Err(ConfigError::MissingBusFrequency);
    }
    let local_bus_hz = bus_frequency_hz
        .checked_div(clkdiv)
        .ok_or(ConfigError::InvalidClockDivider)?;

    let khz = local_bus_hz / 1000;
    1_000_000_000u32
        .checked_div(khz)
        .ok_or(ConfigError::MissingBusFrequency)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
