//! Closed-loop simulation: driver ⇄ simulated sensor.
//!
//! The harness owns a [`Poller`] over a [`SimulatedSensor`] and drives its
//! environment (ground-truth temperature and havoc) tick by tick. The poller
//! provides the one-tick response register, so the command computed at tick
//! *t* is answered at *t* and observed by the driver at *t+1*.

use probe_core::{DriverCfg, DriverState, PollStats, Poller, TickReport};
use probe_traits::Temperature;

use crate::faults::FaultPlan;
use crate::profile::TemperatureProfile;
use crate::sensor::{PeripheralState, SimConditions, SimulatedSensor};

/// Environment inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stimulus {
    pub real_temp: Temperature,
    pub havoc: bool,
}

impl Stimulus {
    pub const fn calm(real_temp: Temperature) -> Self {
        Self {
            real_temp,
            havoc: false,
        }
    }
}

/// Everything observable about one simulated tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickRecord {
    pub report: TickReport,
    /// Driver state committed this tick.
    pub driver: DriverState,
    pub stimulus: Stimulus,
    /// Sensor registers after this tick.
    pub peripheral: PeripheralState,
    /// Whether the sensor converted a new sample this tick.
    pub conversion: bool,
}

pub struct SimulationHarness {
    poller: Poller<SimulatedSensor>,
    conditions: SimConditions,
}

impl SimulationHarness {
    pub fn new(cfg: DriverCfg) -> Self {
        let sensor = SimulatedSensor::new(cfg.sentinel_temp);
        let conditions = sensor.conditions();
        let poller = Poller::new(sensor, cfg);
        Self { poller, conditions }
    }

    /// Run one tick under `stimulus`.
    pub fn tick(&mut self, stimulus: Stimulus) -> TickRecord {
        self.conditions.set_real_temp(stimulus.real_temp);
        self.conditions.set_havoc(stimulus.havoc);
        let report = self.poller.tick();
        let sensor = self.poller.peripheral();
        TickRecord {
            report,
            driver: *self.poller.driver().state(),
            stimulus,
            peripheral: sensor.state(),
            conversion: sensor.converted(),
        }
    }

    /// Run `ticks` more ticks, taking havoc and temperature from the plan
    /// and profile at each absolute tick number.
    pub fn run(
        &mut self,
        plan: &FaultPlan,
        profile: &TemperatureProfile,
        ticks: u64,
    ) -> Vec<TickRecord> {
        let start = self.poller.ticks();
        (start..start.saturating_add(ticks))
            .map(|t| {
                self.tick(Stimulus {
                    real_temp: profile.at(t),
                    havoc: plan.is_havoc(t),
                })
            })
            .collect()
    }

    pub fn run_stimuli(&mut self, stimuli: impl IntoIterator<Item = Stimulus>) -> Vec<TickRecord> {
        stimuli.into_iter().map(|s| self.tick(s)).collect()
    }

    pub fn poller(&self) -> &Poller<SimulatedSensor> {
        &self.poller
    }

    pub fn stats(&self) -> &PollStats {
        self.poller.stats()
    }
}

impl Default for SimulationHarness {
    fn default() -> Self {
        Self::new(DriverCfg::default())
    }
}
