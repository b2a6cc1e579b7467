//! Simulation commands: deterministic runs, paced polling and the self-check.

use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use probe_config::{Config, SimSection};
use probe_core::{DriverCfg, PollCfg, PollStats, Poller, TickReport};
use probe_hardware::{
    FaultPlan, HavocWindow, SimulatedSensor, SimulationHarness, Stimulus, TemperatureProfile,
    TickRecord, check_trace, fault_plan_from_config,
};
use probe_traits::Command;
use probe_traits::clock::MonotonicClock;
use serde_json::json;
use thiserror::Error;

/// One or more self-check scenarios did not behave.
#[derive(Debug, Error)]
#[error("self-check failed: {} of {total} scenarios", .failures.len())]
pub struct SelfCheckFailed {
    pub total: usize,
    /// `scenario: problem` lines.
    pub failures: Vec<String>,
}

pub struct SimulateArgs {
    pub ticks: u64,
    pub temp: Option<i32>,
    pub havoc: Vec<HavocWindow>,
    pub stats: bool,
}

/// Effective `[sim]` section after command-line overrides.
fn sim_section(cfg: &Config, temp: Option<i32>, havoc: &[HavocWindow]) -> SimSection {
    let mut sim = cfg.sim.clone();
    if let Some(t) = temp {
        sim.temperature = t;
        sim.ramp_every = 0;
    }
    if !havoc.is_empty() {
        sim.havoc = havoc
            .iter()
            .map(|w| probe_config::HavocWindow {
                start: w.start,
                end: w.end,
            })
            .collect();
    }
    sim
}

fn tick_json(report: &TickReport, stimulus: Stimulus) -> serde_json::Value {
    json!({
        "tick": report.tick,
        "havoc": stimulus.havoc,
        "real_temp": stimulus.real_temp,
        "command": report.command.as_str(),
        "phase": report.phase.as_str(),
        "cmd_ok": report.answered.cmd_ok,
        "fresh": report.answered.fresh,
        "temp": report.answered.temp,
        "last_read_success": report.telemetry.last_read_success,
        "temp_ever_valid": report.telemetry.temp_ever_valid,
        "last_good_temp": report.telemetry.valid_temp(),
        "fault": report.fault.as_ref().map(ToString::to_string),
    })
}

fn print_tick(report: &TickReport, stimulus: Stimulus, json: bool) {
    if json {
        println!("{}", tick_json(report, stimulus));
        return;
    }
    let temp = report
        .telemetry
        .valid_temp()
        .map_or_else(|| "-".to_string(), |t| t.to_string());
    println!(
        "{:>6}  {:<5}  {:>5}  {:<14}  {:<12}  ok={:<5}  read={:<5}  temp={temp}",
        report.tick,
        if stimulus.havoc { "HAVOC" } else { "" },
        stimulus.real_temp,
        report.command.as_str(),
        report.phase.as_str(),
        report.answered.cmd_ok,
        report.telemetry.last_read_success,
    );
}

fn print_summary(stats: &PollStats, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "summary": true,
                "ticks": stats.ticks,
                "successful_reads": stats.successful_reads,
                "recoveries": stats.recoveries,
                "first_valid_tick": stats.first_valid_tick,
            })
        );
    } else {
        println!(
            "{} ticks, {} successful reads, {} recoveries",
            stats.ticks, stats.successful_reads, stats.recoveries
        );
    }
}

/// Print the full counter set to stderr.
fn print_stats(stats: &PollStats) {
    let first_valid = stats
        .first_valid_tick
        .map_or_else(|| "never".to_string(), |t| t.to_string());
    eprintln!("\n--- Probe Stats ---");
    eprintln!("Ticks: {}", stats.ticks);
    eprintln!("Accepted / rejected: {} / {}", stats.accepted, stats.rejected);
    eprintln!("Transport faults: {}", stats.transport_faults);
    eprintln!(
        "Successful reads: {} ({:.1}%)",
        stats.successful_reads,
        stats.read_ratio() * 100.0
    );
    eprintln!("First valid temperature at tick: {first_valid}");
    eprintln!("Recoveries: {}", stats.recoveries);
    eprintln!("Longest outage (ticks): {}", stats.longest_outage);
    eprintln!("Overruns: {}", stats.overruns);
    eprintln!("-------------------\n");
}

/// Deterministic closed-loop run, as fast as the machine allows.
pub fn run_simulate(cfg: &Config, args: &SimulateArgs, json: bool) -> eyre::Result<PollStats> {
    let sim = sim_section(cfg, args.temp, &args.havoc);
    let plan = fault_plan_from_config(&sim).wrap_err("invalid havoc schedule")?;
    let profile = TemperatureProfile::from(&sim);
    let mut harness = SimulationHarness::new(DriverCfg::from(&cfg.driver));

    tracing::info!(ticks = args.ticks, "simulation start");
    for t in 0..args.ticks {
        let rec = harness.tick(Stimulus {
            real_temp: profile.at(t),
            havoc: plan.is_havoc(t),
        });
        print_tick(&rec.report, rec.stimulus, json);
    }

    let stats = harness.stats().clone();
    print_summary(&stats, json);
    if args.stats {
        print_stats(&stats);
    }
    Ok(stats)
}

/// Clock-paced polling of the simulated sensor until `shutdown` or the tick
/// limit. The configured fault plan and profile drive the sensor's
/// environment.
pub fn run_paced(
    cfg: &Config,
    ticks: Option<u64>,
    stats: bool,
    json: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<PollStats> {
    let plan = fault_plan_from_config(&cfg.sim).wrap_err("invalid havoc schedule")?;
    let profile = TemperatureProfile::from(&cfg.sim);
    let mut poll = PollCfg::from(&cfg.poll);
    if let Some(n) = ticks {
        poll.max_ticks = n;
    }
    poll.validate()?;

    let driver = DriverCfg::from(&cfg.driver);
    let sensor = SimulatedSensor::new(driver.sentinel_temp);
    let conditions = sensor.conditions();
    let mut poller = Poller::builder()
        .with_peripheral(sensor)
        .with_driver_cfg(driver)
        .build()?;

    let stimulus = |t: u64| Stimulus {
        real_temp: profile.at(t),
        havoc: plan.is_havoc(t),
    };
    let apply = |s: Stimulus| {
        conditions.set_real_temp(s.real_temp);
        conditions.set_havoc(s.havoc);
    };

    apply(stimulus(0));
    let result = poller.run(&MonotonicClock::new(), &poll, shutdown, |report| {
        print_tick(report, stimulus(report.tick), json);
        apply(stimulus(report.tick.saturating_add(1)));
    });

    print_summary(&result, json);
    if stats {
        print_stats(&result);
    }
    Ok(result)
}

struct Scenario {
    name: &'static str,
    plan: FaultPlan,
    profile: TemperatureProfile,
    ticks: u64,
    /// Extra expectations beyond the trace checker.
    expect: fn(&[TickRecord]) -> Vec<String>,
}

fn cold_start(trace: &[TickRecord]) -> Vec<String> {
    let mut problems = Vec::new();
    let commands: Vec<Command> = trace.iter().map(|r| r.report.command).collect();
    if commands.first() != Some(&Command::Reset) {
        problems.push(format!("tick 0 issued {:?}, expected Reset", commands.first()));
    }
    if commands.get(1) != Some(&Command::SetIntEnable) {
        problems.push(format!(
            "tick 1 issued {:?}, expected SetIntEnable",
            commands.get(1)
        ));
    }
    if let Some(t) = commands.iter().skip(2).position(|c| *c != Command::Read) {
        problems.push(format!("tick {} left polling", t + 2));
    }
    match trace.iter().find(|r| r.report.telemetry.last_read_success) {
        Some(r) if r.report.telemetry.valid_temp() == Some(20) => {}
        Some(r) => problems.push(format!(
            "first read at tick {} reported {:?}, expected 20",
            r.report.tick,
            r.report.telemetry.valid_temp()
        )),
        None => problems.push("no successful read".to_string()),
    }
    problems
}

fn ends_polling(trace: &[TickRecord]) -> Vec<String> {
    match trace.last() {
        Some(r) if r.report.telemetry.valid_temp() == Some(r.stimulus.real_temp) => Vec::new(),
        Some(r) => vec![format!(
            "final temperature {:?}, ground truth {}",
            r.report.telemetry.valid_temp(),
            r.stimulus.real_temp
        )],
        None => vec!["empty trace".to_string()],
    }
}

fn scenarios() -> eyre::Result<Vec<Scenario>> {
    Ok(vec![
        Scenario {
            name: "cold-start",
            plan: FaultPlan::none(),
            profile: TemperatureProfile::Constant(20),
            ticks: 8,
            expect: cold_start,
        },
        Scenario {
            name: "havoc-recovery",
            plan: FaultPlan::from_windows([HavocWindow::new(6, 9)?, HavocWindow::new(20, 21)?]),
            profile: TemperatureProfile::Constant(20),
            ticks: 30,
            expect: ends_polling,
        },
        Scenario {
            name: "periodic-havoc-ramp",
            plan: FaultPlan::none().with_burst(12, 2)?,
            profile: TemperatureProfile::Ramp {
                start: 15,
                step: 1,
                every: 4,
            },
            ticks: 60,
            expect: |_| Vec::new(),
        },
    ])
}

/// Run the built-in scenarios through the trace checker.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let driver = DriverCfg::from(&cfg.driver);
    let scenarios = scenarios()?;
    let total = scenarios.len();
    let mut failures = Vec::new();

    for s in &scenarios {
        let mut harness = SimulationHarness::new(driver);
        let trace = harness.run(&s.plan, &s.profile, s.ticks);
        let mut problems: Vec<String> = check_trace(&trace).iter().map(ToString::to_string).collect();
        problems.extend((s.expect)(&trace));

        if json {
            println!(
                "{}",
                json!({ "scenario": s.name, "ok": problems.is_empty(), "problems": problems })
            );
        } else if problems.is_empty() {
            println!("{}: ok", s.name);
        } else {
            println!("{}: FAILED", s.name);
            for p in &problems {
                println!("  - {p}");
            }
        }
        tracing::info!(scenario = s.name, problems = problems.len(), "self-check scenario");
        failures.extend(problems.into_iter().map(|p| format!("{}: {p}", s.name)));
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SelfCheckFailed { total, failures }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenarios_pass() {
        let trace_ok = scenarios().unwrap().into_iter().all(|s| {
            let trace = SimulationHarness::default().run(&s.plan, &s.profile, s.ticks);
            check_trace(&trace).is_empty() && (s.expect)(&trace).is_empty()
        });
        assert!(trace_ok);
    }

    #[test]
    fn command_line_overrides_replace_config() {
        let mut cfg = Config::default();
        cfg.sim.ramp_every = 3;
        cfg.sim.havoc = vec![probe_config::HavocWindow { start: 1, end: 2 }];
        let sim = sim_section(&cfg, Some(-5), &[HavocWindow::new(4, 6).unwrap()]);
        assert_eq!(sim.temperature, -5);
        assert_eq!(sim.ramp_every, 0);
        assert_eq!(sim.havoc, vec![probe_config::HavocWindow { start: 4, end: 6 }]);
    }
}
