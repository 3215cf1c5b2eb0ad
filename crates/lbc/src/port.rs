//! Register access trait for one UPM-backed chip-select.
//!
//! A [`UpmPort`] bundles the three hardware touch points a user-programmable
//! machine exposes: its mode register (MAMR/MBMR/MCMR), the controller-wide
//! data register (MDR), and dummy byte accesses into the chip-select window
//! that clock the machine. Board support implements this over memory-mapped
//! I/O; tests use [`crate::mocks::MockPort`].
//!
//! All operations are synchronous, atomic, and ordered — the caller relies
//! on each write being posted to the bus before the next access starts,
//! which is why the mode and data registers have explicit read-back methods
//! (a big-endian I/O read flushes the posted write).

/// Register-level access to one UPM and its chip-select window.
pub trait UpmPort {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read the machine mode register (MxMR).
    fn read_mode(&mut self) -> Result<u32, Self::Error>;

    /// Write the machine mode register (MxMR).
    fn write_mode(&mut self, value: u32) -> Result<(), Self::Error>;

    /// Write the machine data register (MDR).
    fn write_data(&mut self, value: u32) -> Result<(), Self::Error>;

    /// Read the machine data register (MDR) back.
    ///
    /// Used as a posting flush between an MDR write and the strobe that
    /// latches it into the program RAM.
    fn read_data(&mut self) -> Result<u32, Self::Error>;

    /// Issue a dummy single-byte write to `addr` inside the chip-select
    /// window, clocking the machine once.
    fn strobe(&mut self, addr: u32) -> Result<(), Self::Error>;
}
