//! `From` implementations bridging `probe_config` types to `probe_core` types.

use crate::config::{DriverCfg, PollCfg};

impl From<&probe_config::DriverSection> for DriverCfg {
    fn from(c: &probe_config::DriverSection) -> Self {
        Self {
            sentinel_temp: c.sentinel_temp,
        }
    }
}

impl From<&probe_config::PollSection> for PollCfg {
    fn from(c: &probe_config::PollSection) -> Self {
        Self {
            rate_hz: c.rate_hz,
            max_ticks: c.max_ticks,
        }
    }
}
