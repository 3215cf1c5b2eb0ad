//! Writing a compiled program into the machine's RAM.
//!
//! The protocol is order-sensitive throughout: the machine is switched to
//! write-to-array mode, then each of the 64 words is placed in the shared
//! data register and clocked in by a dummy byte access to the chip-select
//! window, confirmed by polling the machine address counter until it
//! reports having consumed exactly that word. Afterwards the machine is
//! restored to normal operation with the loop repeat fields set for the
//! compiler's LOOP encoding.
//!
//! While a programming sequence runs, the chip-select must not see any
//! other traffic — the arbiter guarantees this by holding its lock for
//! the whole sequence.

use lbc::regs::{
    MXMR_MAD, MXMR_OP, MXMR_OP_NORMAL, MXMR_OP_WRITE_ARRAY, MXMR_RLF_SHIFT, MXMR_WLF_SHIFT,
};
use lbc::UpmPort;
use upm::inst::LOOP_COUNT;
use upm::UpmProgram;

/// Upper bound on acknowledgment polls per program word.
///
/// The hardware protocol itself has no timeout; a wedged machine would
/// stall the sequence (and the arbiter lock) forever. Bounding the poll
/// converts that hang into [`ProgramError::NoAck`]. The bound is generous:
/// a healthy machine acknowledges within a handful of bus cycles.
pub const MAX_ACK_POLLS: u32 = 1_000_000;

/// Errors raised while programming the machine RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramError<E> {
    /// The machine never acknowledged consuming a word.
    ///
    /// Fatal: the program RAM is now partially written and the machine
    /// must be considered unusable until reset.
    NoAck {
        /// Index of the word that was not acknowledged.
        index: u8,
    },
    /// A register access failed.
    Port(E),
}

impl<E> From<E> for ProgramError<E> {
    fn from(err: E) -> Self {
        Self::Port(err)
    }
}

/// Stream `program` into the machine RAM behind `port`.
///
/// On success the machine is back in normal operation with read and write
/// loop fields of [`LOOP_COUNT`], executing the new program on the next
/// chip-select access.
///
/// # Errors
///
/// [`ProgramError::NoAck`] if a word is never acknowledged within
/// [`MAX_ACK_POLLS`] polls; any port error is passed through. In both
/// cases the machine is left mid-protocol and requires external recovery.
pub fn program_machine<P: UpmPort>(
    port: &mut P,
    program: &UpmProgram,
) -> Result<(), ProgramError<P::Error>> {
    // Enter write-to-array mode with the address counter at zero. The
    // read-back flushes the posted write before the first strobe.
    let mode = port.read_mode()?;
    port.write_mode((mode & !(MXMR_OP | MXMR_MAD)) | MXMR_OP_WRITE_ARRAY)?;
    let _ = port.read_mode()?;

    for (i, word) in program.words.iter().enumerate() {
        port.write_data(*word)?;
        let _ = port.read_data()?;

        port.strobe(program.io_addr)?;

        // The counter must advance to i + 1 before the next word goes in.
        let expect = (i as u32).wrapping_add(1);
        let mut acknowledged = false;
        for _ in 0..MAX_ACK_POLLS {
            if (port.read_mode()? ^ expect) & MXMR_MAD == 0 {
                acknowledged = true;
                break;
            }
        }
        if !acknowledged {
            return Err(ProgramError::NoAck { index: i as u8 });
        }
    }

    // Restore normal operation; the loop fields multiply every LOOP block
    // the compiler emitted.
    let mode = port.read_mode()?;
    let restored = (mode & !(MXMR_OP | MXMR_MAD))
        | MXMR_OP_NORMAL
        | (LOOP_COUNT as u32) << MXMR_RLF_SHIFT
        | (LOOP_COUNT as u32) << MXMR_WLF_SHIFT;
    port.write_mode(restored)?;
    let _ = port.read_mode()?;

    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
