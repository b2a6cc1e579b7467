//! The polling loop that owns the driver and its peripheral.
//!
//! `Poller::tick` is one tick of the closed loop:
//!
//! 1. the driver consumes the response held in the one-tick register,
//! 2. the resulting command goes out to the peripheral,
//! 3. the peripheral's answer is stored in the register for the next tick.
//!
//! So the command computed at tick *t* is answered at *t* and observed by the
//! driver at *t+1*. The poller takes `&mut self` for a whole tick, which is
//! what serializes the driver's read-modify-write.

use std::sync::atomic::{AtomicBool, Ordering};

use probe_traits::clock::Clock;
use probe_traits::{Command, Peripheral, Response};

use crate::builder::{Missing, PollerBuilder};
use crate::config::{DriverCfg, PollCfg};
use crate::driver::{Driver, Telemetry};
use crate::error::DriverError;
use crate::stats::PollStats;
use crate::status::Phase;
use crate::transport;
use crate::util::tick_period;

/// What happened on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Response the driver consumed this tick (answer to last tick's command).
    pub observed: Response,
    /// Command issued this tick.
    pub command: Command,
    /// Peripheral's answer to `command`; the driver sees it next tick.
    pub answered: Response,
    pub telemetry: Telemetry,
    pub prev_phase: Phase,
    pub phase: Phase,
    /// Set when the exchange failed below the protocol level.
    pub fault: Option<DriverError>,
}

pub struct Poller<P: Peripheral> {
    pub(crate) driver: Driver,
    pub(crate) peripheral: P,
    pub(crate) pending: Response,
    pub(crate) tick: u64,
    pub(crate) stats: PollStats,
}

impl<P: Peripheral> core::fmt::Debug for Poller<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Poller")
            .field("tick", &self.tick)
            .field("phase", &self.driver.phase())
            .field("telemetry", &self.driver.telemetry())
            .finish()
    }
}

impl<P: Peripheral> Poller<P> {
    /// Start building a Poller.
    pub fn builder() -> PollerBuilder<P, Missing> {
        PollerBuilder::default()
    }

    /// Cold-start poller: the first tick feeds the driver "no response yet".
    pub fn new(peripheral: P, cfg: DriverCfg) -> Self {
        let driver = Driver::new(cfg);
        Self {
            pending: driver.no_response_yet(),
            driver,
            peripheral,
            tick: 0,
            stats: PollStats::default(),
        }
    }

    /// Run one tick of the closed loop.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick;
        let observed = self.pending;
        let prev_phase = self.driver.phase();

        let command = self.driver.step(observed);
        let sentinel = self.driver.cfg().sentinel_temp;
        let (answered, fault) = transport::exchange(&mut self.peripheral, command, sentinel);
        self.pending = answered;

        let report = TickReport {
            tick,
            observed,
            command,
            answered,
            telemetry: self.driver.telemetry(),
            prev_phase,
            phase: self.driver.phase(),
            fault,
        };
        self.stats.record(&report);
        tracing::debug!(
            tick,
            command = %command,
            phase = %report.phase,
            cmd_ok = answered.cmd_ok,
            fresh = answered.fresh,
            "tick"
        );

        self.tick = self.tick.saturating_add(1);
        report
    }

    /// Tick at `cfg.rate_hz` until `shutdown` is set or `cfg.max_ticks` is
    /// reached, handing every report to `on_tick`.
    pub fn run<C: Clock>(
        &mut self,
        clock: &C,
        cfg: &PollCfg,
        shutdown: &AtomicBool,
        mut on_tick: impl FnMut(&TickReport),
    ) -> PollStats {
        let period = tick_period(cfg.rate_hz);
        let mut deadline = clock.now();
        let mut done: u64 = 0;
        tracing::info!(rate_hz = cfg.rate_hz, max_ticks = cfg.max_ticks, "polling start");

        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!(ticks = done, "shutdown requested");
                break;
            }
            if cfg.max_ticks > 0 && done >= cfg.max_ticks {
                break;
            }

            let report = self.tick();
            on_tick(&report);
            done += 1;

            deadline += period;
            let late = clock.sleep_until(deadline);
            if late > period {
                self.stats.overruns = self.stats.overruns.saturating_add(1);
                tracing::warn!(late_us = late.as_micros() as u64, "tick overrun; resyncing");
                deadline = clock.now();
            }
        }

        tracing::info!(
            ticks = self.stats.ticks,
            successful_reads = self.stats.successful_reads,
            recoveries = self.stats.recoveries,
            "polling stop"
        );
        self.stats.clone()
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn telemetry(&self) -> Telemetry {
        self.driver.telemetry()
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
