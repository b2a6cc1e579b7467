//! Protocol vocabulary and hardware seams shared by every probe crate.
//!
//! The driver talks to its sensor through exactly one command per tick and
//! receives one [`Response`] for it. Anything that can carry that exchange
//! (a real bus, a simulation model, a test double) implements [`Peripheral`].

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Temperature as reported by the sensor, in whole degrees.
pub type Temperature = i32;

/// A command issued to the peripheral. Exactly one is sent per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Command {
    /// Nothing on the wire this tick. Never accepted.
    #[default]
    None,
    Reset,
    Read,
    SetIntEnable,
    SetIntDisable,
}

impl Command {
    /// Stable lowercase name used in logs and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::None => "none",
            Command::Reset => "reset",
            Command::Read => "read",
            Command::SetIntEnable => "set_int_enable",
            Command::SetIntDisable => "set_int_disable",
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The peripheral's answer to one [`Command`].
///
/// `temp` and `fresh` only carry meaning when `cmd_ok` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub cmd_ok: bool,
    pub temp: Temperature,
    pub fresh: bool,
}

impl Response {
    /// A rejected exchange carrying `sentinel` as its (meaningless) temperature.
    ///
    /// Also serves as the synthetic "no response yet" value on the first tick.
    #[inline]
    pub const fn rejected(sentinel: Temperature) -> Self {
        Self {
            cmd_ok: false,
            temp: sentinel,
            fresh: false,
        }
    }
}

/// Transport seam between the driver and its sensor.
pub trait Peripheral {
    /// Issue `cmd` and collect the peripheral's response for this tick.
    ///
    /// An `Err` means the exchange never completed at the bus level. Callers
    /// treat it exactly like a rejected command.
    fn transact(
        &mut self,
        cmd: Command,
    ) -> Result<Response, Box<dyn std::error::Error + Send + Sync>>;
}

impl<P: Peripheral + ?Sized> Peripheral for Box<P> {
    fn transact(
        &mut self,
        cmd: Command,
    ) -> Result<Response, Box<dyn std::error::Error + Send + Sync>> {
        (**self).transact(cmd)
    }
}
