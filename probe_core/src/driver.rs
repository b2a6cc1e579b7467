//! The fault-recovering polling state machine (`Driver`).
//!
//! One call to [`Driver::step`] is one tick. The driver receives the response
//! to the command it issued on the previous tick, updates its state, and
//! returns the command for this tick. Every next-state value is computed from
//! a snapshot of the prior state plus the new response, then the whole state
//! is committed in one assignment, so no field can observe another field's
//! value from the same tick.
//!
//! There is no error path: a rejected command simply drops the driver back to
//! [`Phase::Resetting`] and the next tick retries.

use probe_traits::{Command, Response, Temperature};

use crate::combinators::StickyOr;
use crate::config::DriverCfg;
use crate::status::Phase;

/// Everything the driver remembers between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverState {
    pub reset_confirmed: bool,
    pub init_confirmed: bool,
    pub last_read_success: bool,
    pub temp_ever_valid: StickyOr,
    pub last_good_temp: Temperature,
    /// Command issued on the previous tick; the incoming response answers it.
    pub prev_command: Command,
}

impl DriverState {
    /// Cold-start state: nothing confirmed, temperature at `sentinel`.
    pub const fn cold(sentinel: Temperature) -> Self {
        Self {
            reset_confirmed: false,
            init_confirmed: false,
            last_read_success: false,
            temp_ever_valid: StickyOr::new(),
            last_good_temp: sentinel,
            prev_command: Command::None,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_flags(self.reset_confirmed, self.init_confirmed)
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            last_read_success: self.last_read_success,
            temp_ever_valid: self.temp_ever_valid.get(),
            last_good_temp: self.last_good_temp,
        }
    }

    /// Pure transition: prior state + response → next state and next command.
    fn next(&self, response: Response) -> (Self, Command) {
        let reset_confirmed = response.cmd_ok;

        let init_confirmed = if !reset_confirmed {
            false
        } else if self.prev_command == Command::SetIntEnable && response.cmd_ok {
            true
        } else {
            self.init_confirmed
        };

        let last_read_success =
            self.prev_command == Command::Read && response.cmd_ok && response.fresh;

        let mut temp_ever_valid = self.temp_ever_valid;
        temp_ever_valid.step(last_read_success);

        let last_good_temp = if last_read_success {
            response.temp
        } else {
            self.last_good_temp
        };

        let command = if !reset_confirmed {
            Command::Reset
        } else if !init_confirmed {
            Command::SetIntEnable
        } else {
            Command::Read
        };

        let next = Self {
            reset_confirmed,
            init_confirmed,
            last_read_success,
            temp_ever_valid,
            last_good_temp,
            prev_command: command,
        };
        (next, command)
    }
}

/// Read-only per-tick output for consumers.
///
/// `last_good_temp` is only meaningful once `temp_ever_valid` is true; use
/// [`Telemetry::valid_temp`] to have the check done for you.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub last_read_success: bool,
    pub temp_ever_valid: bool,
    pub last_good_temp: Temperature,
}

impl Telemetry {
    pub fn valid_temp(&self) -> Option<Temperature> {
        self.temp_ever_valid.then_some(self.last_good_temp)
    }
}

/// Self-healing sensor driver.
#[derive(Debug, Clone)]
pub struct Driver {
    cfg: DriverCfg,
    state: DriverState,
}

impl Driver {
    pub fn new(cfg: DriverCfg) -> Self {
        Self {
            state: DriverState::cold(cfg.sentinel_temp),
            cfg,
        }
    }

    /// The synthetic response fed on the very first tick.
    pub fn no_response_yet(&self) -> Response {
        Response::rejected(self.cfg.sentinel_temp)
    }

    /// Advance one tick with the response to the previous command.
    pub fn step(&mut self, response: Response) -> Command {
        let prior = self.state;
        let (next, command) = prior.next(response);
        self.state = next;

        let (before, after) = (prior.phase(), next.phase());
        if before != after {
            match after {
                Phase::Resetting => {
                    tracing::warn!(from = %before, "peripheral lost; re-entering reset");
                }
                Phase::Initializing => {
                    tracing::debug!(from = %before, "peripheral reset confirmed");
                }
                Phase::Polling => tracing::info!("peripheral initialized; polling"),
            }
        }
        if next.temp_ever_valid.get() && !prior.temp_ever_valid.get() {
            tracing::info!(temp = next.last_good_temp, "first valid temperature");
        }
        command
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.state.telemetry()
    }

    pub fn cfg(&self) -> &DriverCfg {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(temp: Temperature, fresh: bool) -> Response {
        Response {
            cmd_ok: true,
            temp,
            fresh,
        }
    }

    fn driver() -> Driver {
        Driver::new(DriverCfg::default())
    }

    #[test]
    fn cold_start_issues_reset() {
        let mut d = driver();
        let first = d.no_response_yet();
        assert_eq!(d.step(first), Command::Reset);
        assert_eq!(d.phase(), Phase::Resetting);
        assert_eq!(d.telemetry().valid_temp(), None);
    }

    #[test]
    fn walks_reset_init_poll() {
        let mut d = driver();
        let first = d.no_response_yet();
        assert_eq!(d.step(first), Command::Reset);
        assert_eq!(d.step(ok(0, false)), Command::SetIntEnable);
        assert_eq!(d.phase(), Phase::Initializing);
        assert_eq!(d.step(ok(0, false)), Command::Read);
        assert_eq!(d.phase(), Phase::Polling);
    }

    #[test]
    fn reset_ack_does_not_confirm_init() {
        let mut d = driver();
        let first = d.no_response_yet();
        d.step(first);
        // Reset acknowledged: still needs a SetIntEnable acknowledgement.
        assert_eq!(d.step(ok(0, true)), Command::SetIntEnable);
        assert!(!d.state().init_confirmed);
    }

    #[test]
    fn rejection_drops_back_to_reset_from_polling() {
        let mut d = driver();
        let first = d.no_response_yet();
        d.step(first);
        d.step(ok(0, false));
        d.step(ok(0, false));
        assert_eq!(d.phase(), Phase::Polling);
        assert_eq!(d.step(Response::rejected(0)), Command::Reset);
        assert!(!d.state().init_confirmed);
        assert_eq!(d.phase(), Phase::Resetting);
    }

    #[test]
    fn fresh_read_updates_temperature_and_latches_validity() {
        let mut d = driver();
        let first = d.no_response_yet();
        d.step(first);
        d.step(ok(0, false));
        d.step(ok(0, false));
        d.step(ok(21, true));
        let t = d.telemetry();
        assert!(t.last_read_success);
        assert_eq!(t.valid_temp(), Some(21));

        // Stale read keeps the old value; a later outage keeps validity.
        d.step(ok(99, false));
        assert_eq!(d.telemetry().last_good_temp, 21);
        d.step(Response::rejected(-5));
        let t = d.telemetry();
        assert!(!t.last_read_success);
        assert!(t.temp_ever_valid);
        assert_eq!(t.last_good_temp, 21);
    }

    #[test]
    fn fresh_response_to_non_read_is_ignored() {
        let mut d = driver();
        let first = d.no_response_yet();
        d.step(first);
        // Response to Reset carries fresh=true but is not a read.
        d.step(ok(42, true));
        assert!(!d.telemetry().last_read_success);
        assert_eq!(d.telemetry().last_good_temp, 0);
    }

    #[test]
    fn sentinel_comes_from_cfg() {
        let d = Driver::new(DriverCfg { sentinel_temp: -273 });
        assert_eq!(d.telemetry().last_good_temp, -273);
        assert_eq!(d.no_response_yet().temp, -273);
    }
}
