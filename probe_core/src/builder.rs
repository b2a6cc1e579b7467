//! Type-state builder for `Poller`.
//!
//! `build()` only exists once a peripheral was provided. `try_build()` is
//! always available for callers that assemble the poller dynamically.

use std::marker::PhantomData;

use probe_traits::{Peripheral, Temperature};

use crate::config::DriverCfg;
use crate::error::{BuildError, Result};
use crate::poller::Poller;

pub struct Missing;
pub struct Set;

pub struct PollerBuilder<P, S> {
    peripheral: Option<P>,
    driver: Option<DriverCfg>,
    _s: PhantomData<S>,
}

impl<P> Default for PollerBuilder<P, Missing> {
    fn default() -> Self {
        Self {
            peripheral: None,
            driver: None,
            _s: PhantomData,
        }
    }
}

impl<P: Peripheral, S> PollerBuilder<P, S> {
    pub fn with_peripheral(self, peripheral: P) -> PollerBuilder<P, Set> {
        PollerBuilder {
            peripheral: Some(peripheral),
            driver: self.driver,
            _s: PhantomData,
        }
    }

    pub fn with_driver_cfg(mut self, cfg: DriverCfg) -> Self {
        self.driver = Some(cfg);
        self
    }

    /// Shorthand for a driver config that only changes the sentinel.
    pub fn with_sentinel(mut self, sentinel_temp: Temperature) -> Self {
        self.driver = Some(DriverCfg { sentinel_temp });
        self
    }

    /// Build, reporting a missing peripheral as a typed `BuildError`.
    pub fn try_build(self) -> Result<Poller<P>> {
        let peripheral = self
            .peripheral
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPeripheral))?;
        Ok(Poller::new(peripheral, self.driver.unwrap_or_default()))
    }
}

impl<P: Peripheral> PollerBuilder<P, Set> {
    /// Build the poller. Only available once a peripheral is set.
    pub fn build(self) -> Result<Poller<P>> {
        self.try_build()
    }
}
