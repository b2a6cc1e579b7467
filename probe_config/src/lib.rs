#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the probe driver and its simulation.
//!
//! `Config` and its sections are deserialized from TOML and checked with
//! [`Config::validate`]. Every section is optional; an empty file yields the
//! defaults.
use serde::Deserialize;
use serde::de::Deserializer;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DriverSection {
    /// Temperature reported before the first successful read.
    pub sentinel_temp: i32,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PollSection {
    /// Ticks per second for the paced runner.
    pub rate_hz: u32,
    /// 0 runs until interrupted.
    pub max_ticks: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            rate_hz: 10,
            max_ticks: 0,
        }
    }
}

/// Half-open havoc window `[start, end)` in ticks.
///
/// Accepts either a two-element array `[5, 7]` or a table
/// `{ start = 5, end = 7 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HavocWindow {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WindowToml {
    Tuple((u64, u64)),
    Table { start: u64, end: u64 },
}

impl<'de> Deserialize<'de> for HavocWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match WindowToml::deserialize(deserializer)? {
            WindowToml::Tuple((start, end)) | WindowToml::Table { start, end } => {
                HavocWindow { start, end }
            }
        })
    }
}

/// Periodic havoc: `length` failing ticks at the start of every `period`.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct HavocBurst {
    /// 0 disables periodic havoc.
    pub period: u64,
    pub length: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimSection {
    /// Ground-truth temperature at tick 0.
    pub temperature: i32,
    /// Add `ramp_step` every `ramp_every` ticks (0 keeps it constant).
    pub ramp_every: u64,
    pub ramp_step: i32,
    pub havoc: Vec<HavocWindow>,
    pub havoc_every: HavocBurst,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            temperature: 20,
            ramp_every: 0,
            ramp_step: 1,
            havoc: Vec::new(),
            havoc_every: HavocBurst::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Logging {
    /// JSON-lines log file; console only when unset.
    pub file: Option<String>,
    /// Default filter directive ("info", "debug", ...); `--log-level` and
    /// `RUST_LOG` take precedence.
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub driver: DriverSection,
    pub poll: PollSection,
    pub sim: SimSection,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Poll
        if self.poll.rate_hz == 0 {
            eyre::bail!("poll.rate_hz must be > 0");
        }
        if self.poll.rate_hz > 1000 {
            eyre::bail!("poll.rate_hz must be <= 1000");
        }

        // Sim
        if self.sim.ramp_every > 0 && self.sim.ramp_step == 0 {
            eyre::bail!("sim.ramp_step must be != 0 when sim.ramp_every is set");
        }
        for (i, w) in self.sim.havoc.iter().enumerate() {
            if w.end <= w.start {
                eyre::bail!(
                    "sim.havoc[{i}] must have end > start (got [{}, {}])",
                    w.start,
                    w.end
                );
            }
        }
        let burst = self.sim.havoc_every;
        if burst.period > 0 {
            if burst.length == 0 {
                eyre::bail!("sim.havoc_every.length must be >= 1 when period is set");
            }
            if burst.length >= burst.period {
                eyre::bail!("sim.havoc_every.length must be < period");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never|daily|hourly");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = load_toml("").expect("parse empty");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.poll.rate_hz, 10);
        assert_eq!(cfg.sim.temperature, 20);
        cfg.validate().expect("defaults validate");
    }

    #[test]
    fn havoc_windows_accept_tuple_and_table() {
        let cfg = load_toml(
            r#"
[sim]
havoc = [[5, 7], { start = 30, end = 31 }]
"#,
        )
        .expect("parse");
        assert_eq!(
            cfg.sim.havoc,
            vec![
                HavocWindow { start: 5, end: 7 },
                HavocWindow { start: 30, end: 31 }
            ]
        );
    }
}
