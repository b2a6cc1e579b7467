#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Self-healing sensor driver (hardware-agnostic).
//!
//! This crate holds the driver's fault-recovery state machine and the loop
//! that runs it. All peripheral interaction goes through
//! `probe_traits::Peripheral`.
//!
//! ## Architecture
//!
//! - **Combinators**: sticky flags, counters, clocks, sample-and-hold (`combinators`)
//! - **Driver**: reset → init → poll state machine with validity tracking (`driver`)
//! - **Poller**: one-tick response register, transport fault folding, pacing (`poller`)
//! - **Stats**: per-run counters (`stats`)
//! - **Configuration**: runtime config structs (`config`, `conversions`)
//!
//! ## Failure model
//!
//! Nothing in the tick path returns an error. A rejected command, a bus
//! fault, or a device that silently died all look the same to the driver:
//! `cmd_ok == false`, after which it starts over from Reset on the next tick.

pub mod builder;
pub mod combinators;
pub mod config;
pub mod conversions;
pub mod driver;
pub mod error;
pub mod mocks;
pub mod poller;
pub mod stats;
pub mod status;
pub mod transport;
pub mod util;

pub use builder::PollerBuilder;
pub use config::{DriverCfg, PollCfg};
pub use driver::{Driver, DriverState, Telemetry};
pub use error::{BuildError, DriverError};
pub use poller::{Poller, TickReport};
pub use stats::PollStats;
pub use status::Phase;
