#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Simulated temperature peripheral and closed-loop harness.
//!
//! - `sensor`: fault-injecting model of the device behind the bus
//! - `faults` / `profile`: havoc schedules and ground-truth temperature
//! - `harness`: driver ⇄ sensor loop with a one-tick response register
//! - `check`: trace checker for the driver's recovery guarantees

pub mod check;
pub mod error;
pub mod faults;
pub mod harness;
pub mod profile;
pub mod sensor;

pub use check::{Violation, check_trace};
pub use faults::{FaultPlan, HavocWindow};
pub use harness::{SimulationHarness, Stimulus, TickRecord};
pub use profile::TemperatureProfile;
pub use sensor::{PeripheralState, SimConditions, SimulatedSensor};

/// Build the havoc schedule described by a `[sim]` config section.
pub fn fault_plan_from_config(sim: &probe_config::SimSection) -> error::Result<FaultPlan> {
    let mut plan = FaultPlan::none();
    for w in &sim.havoc {
        plan = plan.with_window(HavocWindow::new(w.start, w.end)?);
    }
    let burst = sim.havoc_every;
    if burst.period > 0 {
        plan = plan.with_burst(burst.period, burst.length)?;
    }
    Ok(plan)
}

impl From<&probe_config::SimSection> for TemperatureProfile {
    fn from(sim: &probe_config::SimSection) -> Self {
        if sim.ramp_every == 0 {
            TemperatureProfile::Constant(sim.temperature)
        } else {
            TemperatureProfile::Ramp {
                start: sim.temperature,
                step: sim.ramp_step,
                every: sim.ramp_every,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_sections_map_to_plan_and_profile() {
        let cfg = probe_config::load_toml(
            r#"
[sim]
temperature = 18
ramp_every = 2
ramp_step = 3
havoc = [[4, 6]]
havoc_every = { period = 10, length = 1 }
"#,
        )
        .unwrap();
        let plan = fault_plan_from_config(&cfg.sim).unwrap();
        let hits: Vec<u64> = (0..12).filter(|&t| plan.is_havoc(t)).collect();
        assert_eq!(hits, [0, 4, 5, 10]);

        let profile = TemperatureProfile::from(&cfg.sim);
        assert_eq!(profile.at(0), 18);
        assert_eq!(profile.at(5), 24);
    }
}
