//! Local bus controller (LBC) layer for MPC83xx/MPC85xx user-programmable
//! machines.
//!
//! This crate is the hardware-facing seam of the UPM PATA stack. It owns no
//! policy: it defines the register-level access trait the rest of the
//! workspace programs against, the MxMR register field encodings, and the
//! board-specific timing inputs read from configuration.
//!
//! # Architecture Layers
//!
//! ```text
//! PIO arbitration (pata crate)
//!         ↓
//! Microcode compiler (upm crate)
//!         ↓
//! LBC access layer (this crate - trait + constants)
//!         ↓
//! Memory-mapped registers (board support code)
//! ```
//!
//! # Features
//!
//! - `std`: expose the [`mocks`] module outside of tests
//! - `defmt`: enable defmt logging derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
// Pedantic lints suppressed for this register-level crate:
#![allow(clippy::doc_markdown)] // register names and hex addresses in doc comments
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod mocks;
pub mod port;
pub mod regs;
pub mod timings;

pub use port::UpmPort;
pub use timings::{bus_period_from_lcrr, bus_period_ps, ConfigError, LocalBusTimings};
