//! UPM microcode timing compiler.
//!
//! Translates vendor-specified abstract ATA PIO timings (nanoseconds, board
//! independent) into a 64-word microcode program for an MPC83xx/MPC85xx
//! user-programmable machine, at a given local bus clock period and with
//! board-specific skew corrections applied.
//!
//! The pipeline is pure and allocation-free:
//!
//! ```text
//! timing table ─▶ populate (ps)  ─▶ quantize (clocks) ─▶ encode (words)
//!   [table]        [compile]          [compile]            [program]
//! ```
//!
//! Compilation never mutates the static tables; every invocation derives a
//! fresh per-row scratch buffer and writes into a caller-owned
//! [`UpmProgram`]. Compiling the same inputs twice yields identical
//! programs.
//!
//! No I/O happens here — writing the result to hardware is the `pata`
//! crate's job.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
// Quantizer exemptions from the workspace safety lints: the whole crate is
// bounded integer math over fixed-size tables (ns values ≤ 600, periods in
// the tens of nanoseconds), audited as a unit and covered by property tests.
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::module_name_repetitions)]

pub mod compile;
pub mod convert;
pub mod inst;
pub mod mode;
pub mod program;
pub mod table;

pub use compile::CompileError;
pub use mode::{InvalidPioMode, PioMode};
pub use program::{compile_program, UpmProgram};
