//! Driver phase derived from the confirmation flags.

/// Where the driver is in its reset → init → poll sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Device not confirmed alive; issuing Reset.
    Resetting,
    /// Device alive, interrupts not yet confirmed; issuing SetIntEnable.
    Initializing,
    /// Fully confirmed; issuing Read.
    Polling,
}

impl Phase {
    pub fn from_flags(reset_confirmed: bool, init_confirmed: bool) -> Self {
        match (reset_confirmed, init_confirmed) {
            (false, _) => Phase::Resetting,
            (true, false) => Phase::Initializing,
            (true, true) => Phase::Polling,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Resetting => "resetting",
            Phase::Initializing => "initializing",
            Phase::Polling => "polling",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
