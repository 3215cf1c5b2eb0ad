//! Cross-adapter PIO mode arbitration.
//!
//! All adapters behind one machine share a single timing program, so the
//! bus can only run as fast as its slowest device. The arbiter keeps a
//! registry of attached adapters and, whenever one requests a mode,
//! reprograms the machine for the minimum of every adapter's configured
//! mode. Until every attached adapter has made its first request the
//! effective mode is unknown and the hardware is left untouched.
//!
//! Registry, compilation and hardware programming all happen under one
//! blocking mutex, so concurrent requests from interrupt and thread
//! context serialize and the chip-select never sees traffic mid-program.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::index_map::FnvIndexMap;
use lbc::{LocalBusTimings, UpmPort};
use upm::{compile_program, CompileError, PioMode};

use crate::programmer::{program_machine, ProgramError};

/// Maximum number of adapters one arbiter can track.
pub const MAX_ADAPTERS: usize = 8;

/// Handle identifying an attached adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdapterId(u8);

/// Errors raised by arbiter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterError<E> {
    /// The registry already holds [`MAX_ADAPTERS`] adapters.
    RegistryFull,
    /// The handle does not name an attached adapter.
    UnknownAdapter,
    /// Timing compilation failed.
    Compile(CompileError),
    /// Programming the machine failed.
    Program(ProgramError<E>),
}

impl<E> From<CompileError> for ArbiterError<E> {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl<E> From<ProgramError<E>> for ArbiterError<E> {
    fn from(err: ProgramError<E>) -> Self {
        Self::Program(err)
    }
}

/// Result of a mode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestOutcome {
    /// The requested mode is now active on the bus.
    Applied(PioMode),
    /// A slower sharer capped the bus below the requested mode.
    Downgraded {
        /// Mode the adapter asked for.
        requested: PioMode,
        /// Mode actually programmed.
        actual: PioMode,
    },
    /// Another attached adapter has not requested a mode yet; the
    /// hardware was left untouched.
    Deferred,
}

#[derive(Debug, Clone, Copy)]
struct AdapterSlot {
    configured: Option<PioMode>,
    active: Option<PioMode>,
    io_addr: u32,
    localbus: LocalBusTimings,
}

struct Registry<P> {
    port: P,
    adapters: FnvIndexMap<AdapterId, AdapterSlot, MAX_ADAPTERS>,
    next_id: u8,
}

/// Arbitrates the shared timing program between adapters on one machine.
pub struct PioArbiter<P: UpmPort> {
    bus_period_ps: u32,
    registry: Mutex<CriticalSectionRawMutex, RefCell<Registry<P>>>,
}

impl<P: UpmPort> PioArbiter<P> {
    /// Create an arbiter for the machine behind `port`, with the local
    /// bus clock period in picoseconds.
    pub fn new(port: P, bus_period_ps: u32) -> Self {
        Self {
            bus_period_ps,
            registry: Mutex::new(RefCell::new(Registry {
                port,
                adapters: FnvIndexMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Attach an adapter whose task file decodes at `io_addr`.
    ///
    /// The adapter starts with no configured mode, which defers every
    /// sharer's requests until this adapter makes its own first request.
    ///
    /// # Errors
    ///
    /// [`ArbiterError::RegistryFull`] once [`MAX_ADAPTERS`] are attached.
    pub fn attach(
        &self,
        io_addr: u32,
        localbus: LocalBusTimings,
    ) -> Result<AdapterId, ArbiterError<P::Error>> {
        self.registry.lock(|cell| {
            let mut registry = cell.borrow_mut();
            if registry.adapters.len() >= MAX_ADAPTERS {
                return Err(ArbiterError::RegistryFull);
            }
            // The counter wraps; skip ids still held by live adapters so a
            // stale handle can never alias a newer record.
            let mut candidate = registry.next_id;
            while registry.adapters.contains_key(&AdapterId(candidate)) {
                candidate = candidate.wrapping_add(1);
            }
            let id = AdapterId(candidate);
            let slot = AdapterSlot {
                configured: None,
                active: None,
                io_addr,
                localbus,
            };
            registry
                .adapters
                .insert(id, slot)
                .map_err(|_| ArbiterError::RegistryFull)?;
            registry.next_id = candidate.wrapping_add(1);
            Ok(id)
        })
    }

    /// Detach an adapter, removing its mode from future arbitration.
    ///
    /// The hardware keeps its current program; remaining sharers pick up
    /// the relaxed minimum on their next request.
    ///
    /// # Errors
    ///
    /// [`ArbiterError::UnknownAdapter`] if `id` is not attached.
    pub fn detach(&self, id: AdapterId) -> Result<(), ArbiterError<P::Error>> {
        self.registry.lock(|cell| {
            cell.borrow_mut()
                .adapters
                .remove(&id)
                .map(|_| ())
                .ok_or(ArbiterError::UnknownAdapter)
        })
    }

    /// Mode currently programmed into the hardware, as seen by `id`.
    ///
    /// `None` until the first successful arbitration, or for an unknown
    /// handle.
    pub fn active_mode(&self, id: AdapterId) -> Option<PioMode> {
        self.registry
            .lock(|cell| cell.borrow().adapters.get(&id).and_then(|s| s.active))
    }

    /// Request `mode` for adapter `id` and reprogram the machine.
    ///
    /// Records the request, then takes the minimum over every attached
    /// adapter's configured mode. If some adapter has not requested yet
    /// the result is [`RequestOutcome::Deferred`] and the hardware is
    /// untouched; the request still counts and is picked up once the
    /// last sharer arrives. Otherwise the program for the effective mode
    /// is compiled with the requester's board timings and written to the
    /// machine before the lock is released.
    ///
    /// # Errors
    ///
    /// [`ArbiterError::UnknownAdapter`] for a stale handle; compile and
    /// programming failures are passed through. On a programming failure
    /// no adapter's active mode is updated.
    pub fn request_mode(
        &self,
        id: AdapterId,
        mode: PioMode,
    ) -> Result<RequestOutcome, ArbiterError<P::Error>> {
        self.registry.lock(|cell| {
            let mut registry = cell.borrow_mut();
            let registry = &mut *registry;

            let slot = registry
                .adapters
                .get_mut(&id)
                .ok_or(ArbiterError::UnknownAdapter)?;
            slot.configured = Some(mode);
            let io_addr = slot.io_addr;
            let localbus = slot.localbus;

            let mut actual = mode;
            for slot in registry.adapters.values() {
                match slot.configured {
                    Some(configured) => actual = actual.min(configured),
                    None => {
                        #[cfg(feature = "defmt")]
                        defmt::info!(
                            "PIO {} requested, waiting for other adapters",
                            mode.get()
                        );
                        return Ok(RequestOutcome::Deferred);
                    }
                }
            }

            let program = compile_program(actual, self.bus_period_ps, &localbus, io_addr)?;
            program_machine(&mut registry.port, &program)?;

            for slot in registry.adapters.values_mut() {
                slot.active = Some(actual);
            }

            if actual == mode {
                #[cfg(feature = "defmt")]
                defmt::info!("PIO {} active", actual.get());
                Ok(RequestOutcome::Applied(actual))
            } else {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "PIO {} requested, capped at PIO {} by a slower sharer",
                    mode.get(),
                    actual.get()
                );
                Ok(RequestOutcome::Downgraded {
                    requested: mode,
                    actual,
                })
            }
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
