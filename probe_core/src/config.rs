//! Runtime configuration types for the driver and its polling loop.
//!
//! These are separate from the TOML-deserialized config in `probe_config`;
//! see `conversions` for the mapping.

use probe_traits::Temperature;

use crate::error::{BuildError, Result};

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverCfg {
    /// Value reported as `last_good_temp` before any successful read, and
    /// used as the temperature of rejected responses.
    pub sentinel_temp: Temperature,
}

/// Paced polling loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCfg {
    /// Tick rate in Hz. Clamped to at least 1 when converted to a period.
    pub rate_hz: u32,
    /// Stop after this many ticks. 0 runs until shutdown is requested.
    pub max_ticks: u64,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self {
            rate_hz: 10,
            max_ticks: 0,
        }
    }
}

impl PollCfg {
    /// Highest rate the paced loop accepts.
    pub const MAX_RATE_HZ: u32 = 1000;

    pub fn validate(&self) -> Result<()> {
        if self.rate_hz == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "rate_hz must be > 0",
            )));
        }
        if self.rate_hz > Self::MAX_RATE_HZ {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "rate_hz must be <= 1000",
            )));
        }
        Ok(())
    }
}
