//! Fault-injecting model of the temperature peripheral.
//!
//! The model converts a new sample every other tick while operational and
//! raises its fresh bit on a conversion when interrupts are enabled. A
//! `havoc` tick kills it regardless of the command on the wire; only a Reset
//! brings it back.

use std::cell::Cell;
use std::rc::Rc;

use probe_core::combinators::{AlternatingClock, SampleHold};
use probe_traits::{Command, Peripheral, Response, Temperature};

/// Internal registers of the simulated device. The driver never sees these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralState {
    pub operational: bool,
    pub interrupts_enabled: bool,
    pub fresh_bit: bool,
    pub sampled_temp: Temperature,
}

/// Shared handle to the environment the simulated sensor lives in.
///
/// Clone it before handing the sensor to a poller; setting values through
/// the clone changes what the sensor sees on its next transact.
#[derive(Debug, Clone)]
pub struct SimConditions {
    real_temp: Rc<Cell<Temperature>>,
    havoc: Rc<Cell<bool>>,
}

impl SimConditions {
    fn new(real_temp: Temperature) -> Self {
        Self {
            real_temp: Rc::new(Cell::new(real_temp)),
            havoc: Rc::new(Cell::new(false)),
        }
    }

    pub fn set_real_temp(&self, t: Temperature) {
        self.real_temp.set(t);
    }

    pub fn set_havoc(&self, havoc: bool) {
        self.havoc.set(havoc);
    }

    pub fn real_temp(&self) -> Temperature {
        self.real_temp.get()
    }

    pub fn havoc(&self) -> bool {
        self.havoc.get()
    }
}

/// Simulated temperature sensor.
pub struct SimulatedSensor {
    conditions: SimConditions,
    state: PeripheralState,
    clock: AlternatingClock,
    sample: SampleHold<Temperature>,
    read_accepted_last_tick: bool,
    converted: bool,
    sentinel: Temperature,
}

impl SimulatedSensor {
    /// Powered-off device. `sentinel` is reported as the temperature of any
    /// response that is not an accepted Read, and as the sample register's
    /// content before the first conversion.
    pub fn new(sentinel: Temperature) -> Self {
        SimulatedSensor {
            conditions: SimConditions::new(sentinel),
            state: PeripheralState {
                operational: false,
                interrupts_enabled: false,
                fresh_bit: false,
                sampled_temp: sentinel,
            },
            clock: AlternatingClock::new(),
            sample: SampleHold::new(sentinel),
            read_accepted_last_tick: false,
            converted: false,
            sentinel,
        }
    }

    pub fn conditions(&self) -> SimConditions {
        self.conditions.clone()
    }

    pub fn state(&self) -> PeripheralState {
        self.state
    }

    /// Whether the last step was a conversion tick.
    pub fn converted(&self) -> bool {
        self.converted
    }

    /// Advance the model one tick.
    pub fn step(&mut self, cmd: Command, real_temp: Temperature, havoc: bool) -> Response {
        let prev = self.state;

        let operational = if havoc {
            false
        } else if cmd == Command::Reset {
            true
        } else {
            prev.operational
        };

        let interrupts_enabled = match cmd {
            Command::SetIntEnable => true,
            Command::SetIntDisable => false,
            _ => prev.interrupts_enabled,
        };

        let conversion = self.clock.step() && operational;
        let sampled_temp = self.sample.step(real_temp, conversion);

        // Set wins over clear; the clear lags the accepted Read by one tick.
        let fresh_bit = if conversion && interrupts_enabled {
            true
        } else if self.read_accepted_last_tick {
            false
        } else {
            prev.fresh_bit
        };

        let cmd_ok = operational && cmd != Command::None;
        let read_ok = cmd_ok && cmd == Command::Read;
        let temp = if read_ok { sampled_temp } else { self.sentinel };

        if havoc && prev.operational {
            tracing::debug!(command = %cmd, "havoc: peripheral failed");
        }
        tracing::trace!(
            command = %cmd,
            operational,
            conversion,
            fresh_bit,
            sampled_temp,
            "sim step"
        );

        self.read_accepted_last_tick = read_ok;
        self.converted = conversion;
        self.state = PeripheralState {
            operational,
            interrupts_enabled,
            fresh_bit,
            sampled_temp,
        };

        Response {
            cmd_ok,
            temp,
            fresh: fresh_bit,
        }
    }
}

impl Peripheral for SimulatedSensor {
    fn transact(
        &mut self,
        cmd: Command,
    ) -> Result<Response, Box<dyn std::error::Error + Send + Sync>> {
        let real = self.conditions.real_temp();
        let havoc = self.conditions.havoc();
        Ok(self.step(cmd, real, havoc))
    }
}
