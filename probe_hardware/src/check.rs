//! Trace checker for the driver's recovery guarantees.
//!
//! [`check_trace`] walks a full simulation trace (starting at tick 0) and
//! reports every tick where one of the guarantees below does not hold:
//!
//! - a valid temperature equals the sample behind the latest successful read
//! - 3 havoc-free ticks from tick s give a successful read within s+1..=s+4
//! - an accepted Read returns the most recently converted sample
//! - once havoc stops for good, Read is issued within 2 ticks
//! - `temp_ever_valid` never falls back to false
//! - `last_good_temp` only changes on a successful read
//! - `init_confirmed` implies `reset_confirmed`

use probe_core::combinators::{HeldFor, SeenWithin};
use probe_traits::{Command, Temperature};
use thiserror::Error;

use crate::harness::TickRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("tick {tick}: last_good_temp {got} but the last successful read sampled {expected:?}")]
    Validity {
        tick: u64,
        expected: Option<Temperature>,
        got: Temperature,
    },
    #[error("tick {tick}: 3 havoc-free ticks from here but no successful read in the 4 ticks after")]
    Liveness { tick: u64 },
    #[error("tick {tick}: accepted read returned {got}, last conversion captured {expected}")]
    Accuracy {
        tick: u64,
        expected: Temperature,
        got: Temperature,
    },
    #[error("tick {tick}: havoc-free since {since} but driver issued {command}")]
    BoundedRecovery {
        tick: u64,
        since: u64,
        command: Command,
    },
    #[error("tick {tick}: temp_ever_valid fell back to false")]
    Monotonicity { tick: u64 },
    #[error("tick {tick}: last_good_temp changed from {from} to {to} without a successful read")]
    SpuriousOverwrite {
        tick: u64,
        from: Temperature,
        to: Temperature,
    },
    #[error("tick {tick}: init confirmed while reset is not")]
    InitWithoutReset { tick: u64 },
}

const LIVENESS_QUIET: u32 = 3;
const LIVENESS_WITHIN: u32 = 4;
const RECOVERY_TICKS: usize = 2;

/// Check every guarantee over `records`, which must start at tick 0.
pub fn check_trace(records: &[TickRecord]) -> Vec<Violation> {
    let mut out = Vec::new();

    // Latest real temperature captured at a conversion tick, if any.
    let mut captured: Option<Temperature> = None;
    // Capture behind an accepted Read on the previous tick.
    let mut read_capture: Option<Temperature> = None;
    let mut expected_good: Option<Temperature> = None;

    let mut quiet = HeldFor::new(LIVENESS_QUIET);
    let mut recent_read = SeenWithin::new(LIVENESS_WITHIN);
    // Start ticks of quiet runs, in flight until their read window closes.
    // HeldFor fires at s+2 and the window s+1..=s+4 closes two ticks later.
    let mut armed: [Option<u64>; 2] = [None, None];

    for (i, r) in records.iter().enumerate() {
        let tick = r.report.tick;
        let tel = r.report.telemetry;

        if tel.last_read_success {
            expected_good = read_capture;
        }
        if tel.temp_ever_valid && expected_good != Some(tel.last_good_temp) {
            out.push(Violation::Validity {
                tick,
                expected: expected_good,
                got: tel.last_good_temp,
            });
        }

        if r.conversion {
            captured = Some(r.stimulus.real_temp);
        }
        let read_accepted = r.report.command == Command::Read && r.report.answered.cmd_ok;
        if read_accepted {
            if let Some(expected) = captured {
                if r.report.answered.temp != expected {
                    out.push(Violation::Accuracy {
                        tick,
                        expected,
                        got: r.report.answered.temp,
                    });
                }
            }
        }
        read_capture = if read_accepted { captured } else { None };

        if let Some(prev) = i.checked_sub(1).map(|p| &records[p]) {
            let prev_tel = prev.report.telemetry;
            if prev_tel.temp_ever_valid && !tel.temp_ever_valid {
                out.push(Violation::Monotonicity { tick });
            }
            if !tel.last_read_success && tel.last_good_temp != prev_tel.last_good_temp {
                out.push(Violation::SpuriousOverwrite {
                    tick,
                    from: prev_tel.last_good_temp,
                    to: tel.last_good_temp,
                });
            }
        }

        if r.driver.init_confirmed && !r.driver.reset_confirmed {
            out.push(Violation::InitWithoutReset { tick });
        }

        // Three havoc-free ticks from s must yield a successful read in
        // s+1..=s+4.
        let held = quiet.step(!r.stimulus.havoc);
        let read_seen = recent_read.step(tel.last_read_success);
        if let Some(start) = armed[0] {
            if !read_seen {
                out.push(Violation::Liveness { tick: start });
            }
        }
        armed = [
            armed[1],
            held.then(|| tick.saturating_sub(u64::from(LIVENESS_QUIET) - 1)),
        ];
    }

    // Havoc-free suffix: everything from RECOVERY_TICKS after its start reads.
    let suffix_start = records
        .iter()
        .rposition(|r| r.stimulus.havoc)
        .map_or(0, |p| p + 1);
    if let Some(tail) = records.get(suffix_start + RECOVERY_TICKS..) {
        let since = records
            .get(suffix_start)
            .map_or(0, |r| r.report.tick);
        for r in tail {
            if r.report.command != Command::Read {
                out.push(Violation::BoundedRecovery {
                    tick: r.report.tick,
                    since,
                    command: r.report.command,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::{FaultPlan, HavocWindow};
    use crate::harness::SimulationHarness;
    use crate::profile::TemperatureProfile;

    fn trace() -> Vec<TickRecord> {
        let plan = FaultPlan::from_windows([HavocWindow::new(8, 10).unwrap()]);
        SimulationHarness::default().run(&plan, &TemperatureProfile::Constant(20), 20)
    }

    #[test]
    fn clean_trace_has_no_violations() {
        assert_eq!(check_trace(&trace()), Vec::new());
    }

    #[test]
    fn tampered_telemetry_is_reported() {
        let mut records = trace();
        let last = records.len() - 1;
        records[last].report.telemetry.temp_ever_valid = false;
        records[last].report.telemetry.last_read_success = false;
        records[last].report.telemetry.last_good_temp = 99;

        let found = check_trace(&records);
        let tick = records[last].report.tick;
        assert!(found.contains(&Violation::Monotonicity { tick }));
        assert!(found.contains(&Violation::SpuriousOverwrite {
            tick,
            from: 20,
            to: 99
        }));
    }

    #[test]
    fn missing_reads_after_calm_stretch_break_liveness() {
        let mut records = trace();
        for r in &mut records[11..=16] {
            r.report.telemetry.last_read_success = false;
        }
        let found = check_trace(&records);
        assert!(found.contains(&Violation::Liveness { tick: 10 }));
        assert!(found.contains(&Violation::Liveness { tick: 12 }));
        assert!(!found.contains(&Violation::Liveness { tick: 5 }));
    }

    #[test]
    fn liveness_window_cut_by_trace_end_is_not_reported() {
        let records = trace();
        let mut short = records[..14].to_vec();
        for r in &mut short[11..] {
            r.report.telemetry.last_read_success = false;
        }
        assert!(
            !check_trace(&short)
                .iter()
                .any(|v| matches!(v, Violation::Liveness { .. }))
        );
    }

    #[test]
    fn stuck_driver_breaks_bounded_recovery() {
        let mut records = trace();
        let last = records.len() - 1;
        records[last].report.command = Command::Reset;
        assert!(
            check_trace(&records)
                .iter()
                .any(|v| matches!(v, Violation::BoundedRecovery { since: 10, .. }))
        );
    }
}
