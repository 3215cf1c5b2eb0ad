//! PIO mode management for UPM-attached ATA adapters.
//!
//! Two concerns live here, both side-effecting and therefore kept out of
//! the pure `upm` compiler:
//!
//! - [`programmer`]: streaming a compiled 64-word program into the
//!   machine's RAM through the register protocol (write-to-array mode,
//!   word-by-word strobe and acknowledgment, restore).
//! - [`arbiter`]: agreeing on a single PIO mode when several adapters
//!   share one physical machine. The machine can only hold one program,
//!   so the effective mode is the minimum every sharer has agreed to.
//!
//! One blocking mutex per arbiter serializes mode requests and hardware
//! programming; compilation itself is pure and runs inside the critical
//! section only so a losing race cannot program stale timings.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::module_name_repetitions)]

pub mod arbiter;
pub mod programmer;

pub use arbiter::{AdapterId, ArbiterError, PioArbiter, RequestOutcome};
pub use programmer::{program_machine, ProgramError, MAX_ACK_POLLS};
