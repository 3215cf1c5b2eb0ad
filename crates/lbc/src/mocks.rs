//! Mock port implementations for testing.
//!
//! [`MockPort`] records every register access in order and simulates the
//! MAD counter, so the full program-RAM write protocol can be verified on
//! the host without hardware.

#![cfg(any(test, feature = "std"))]

use crate::port::UpmPort;
use crate::regs::{MXMR_MAD, MXMR_OP, MXMR_OP_WRITE_ARRAY};

/// One recorded hardware access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Mode register write.
    WriteMode(u32),
    /// Data register write.
    WriteData(u32),
    /// Dummy byte strobe at an address.
    Strobe(u32),
}

/// Recording mock of a [`UpmPort`].
///
/// Simulates the machine address counter: while the mode register holds the
/// write-to-array operation, every strobe consumes one word and advances
/// MAD (mod 64), which subsequent mode-register reads report. Setting
/// `wedged` freezes the counter, modeling a machine that never acknowledges.
#[derive(Debug)]
pub struct MockPort {
    /// Every access, in issue order. Sized for several full 64-word
    /// programming sequences (130 accesses each).
    pub accesses: heapless::Vec<Access, 512>,
    /// When true, strobes no longer advance MAD.
    pub wedged: bool,
    mode: u32,
    data: u32,
    mad: u32,
}

impl MockPort {
    /// Create an idle mock port.
    pub fn new() -> Self {
        Self {
            accesses: heapless::Vec::new(),
            wedged: false,
            mode: 0,
            data: 0,
            mad: 0,
        }
    }

    /// Data-register writes, in order.
    pub fn data_writes(&self) -> impl Iterator<Item = u32> + '_ {
        self.accesses.iter().filter_map(|a| match a {
            Access::WriteData(v) => Some(*v),
            _ => None,
        })
    }

    /// Mode-register writes, in order.
    pub fn mode_writes(&self) -> impl Iterator<Item = u32> + '_ {
        self.accesses.iter().filter_map(|a| match a {
            Access::WriteMode(v) => Some(*v),
            _ => None,
        })
    }

    /// Number of strobes issued.
    pub fn strobe_count(&self) -> usize {
        self.accesses
            .iter()
            .filter(|a| matches!(a, Access::Strobe(_)))
            .count()
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl UpmPort for MockPort {
    type Error = core::convert::Infallible;

    fn read_mode(&mut self) -> Result<u32, Self::Error> {
        Ok((self.mode & !MXMR_MAD) | (self.mad & MXMR_MAD))
    }

    fn write_mode(&mut self, value: u32) -> Result<(), Self::Error> {
        let _ = self.accesses.push(Access::WriteMode(value));
        self.mode = value;
        self.mad = value & MXMR_MAD;
        Ok(())
    }

    fn write_data(&mut self, value: u32) -> Result<(), Self::Error> {
        let _ = self.accesses.push(Access::WriteData(value));
        self.data = value;
        Ok(())
    }

    fn read_data(&mut self) -> Result<u32, Self::Error> {
        Ok(self.data)
    }

    fn strobe(&mut self, addr: u32) -> Result<(), Self::Error> {
        let _ = self.accesses.push(Access::Strobe(addr));
        if !self.wedged && self.mode & MXMR_OP == MXMR_OP_WRITE_ARRAY {
            self.mad = self.mad.wrapping_add(1) & MXMR_MAD;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mad_advances_per_strobe_in_write_array_mode() {
        let mut port = MockPort::new();
        port.write_mode(MXMR_OP_WRITE_ARRAY).unwrap();
        for i in 1..=3u32 {
            port.strobe(0x1000).unwrap();
            assert_eq!(port.read_mode().unwrap() & MXMR_MAD, i);
        }
    }

    #[test]
    fn mad_is_frozen_in_normal_mode() {
        let mut port = MockPort::new();
        port.write_mode(0).unwrap();
        port.strobe(0x1000).unwrap();
        assert_eq!(port.read_mode().unwrap() & MXMR_MAD, 0);
    }

    #[test]
    fn recording_survives_consecutive_programming_sequences() {
        // Two full 64-word sequences produce 260 accesses; every one must
        // be retained or assertions on the later sequence lie.
        let mut port = MockPort::new();
        for _ in 0..2 {
            port.write_mode(MXMR_OP_WRITE_ARRAY).unwrap();
            for i in 0..64u32 {
                port.write_data(i).unwrap();
                port.strobe(0x1000).unwrap();
            }
            port.write_mode(0).unwrap();
        }
        assert_eq!(port.accesses.len(), 260);
        assert_eq!(port.mode_writes().count(), 4);
    }

    #[test]
    fn wedged_port_never_acknowledges() {
        let mut port = MockPort::new();
        port.wedged = true;
        port.write_mode(MXMR_OP_WRITE_ARRAY).unwrap();
        port.strobe(0x1000).unwrap();
        assert_eq!(port.read_mode().unwrap() & MXMR_MAD, 0);
    }
}
