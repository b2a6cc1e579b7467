//! Ground-truth temperature over time.

use probe_traits::Temperature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemperatureProfile {
    Constant(Temperature),
    /// `start`, then `+step` every `every` ticks. `every == 0` stays at `start`.
    Ramp {
        start: Temperature,
        step: Temperature,
        every: u64,
    },
    /// Explicit per-tick values; the last one holds past the end.
    Trace(Vec<Temperature>),
}

impl TemperatureProfile {
    pub fn at(&self, tick: u64) -> Temperature {
        match self {
            TemperatureProfile::Constant(t) => *t,
            TemperatureProfile::Ramp { start, step, every } => {
                if *every == 0 {
                    return *start;
                }
                let steps = i64::try_from(tick / every).unwrap_or(i64::MAX);
                let t = i64::from(*start).saturating_add(steps.saturating_mul(i64::from(*step)));
                t.clamp(i64::from(Temperature::MIN), i64::from(Temperature::MAX)) as Temperature
            }
            TemperatureProfile::Trace(values) => usize::try_from(tick)
                .ok()
                .and_then(|i| values.get(i))
                .or_else(|| values.last())
                .copied()
                .unwrap_or_default(),
        }
    }
}

impl Default for TemperatureProfile {
    fn default() -> Self {
        TemperatureProfile::Constant(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_steps_every_n_ticks() {
        let p = TemperatureProfile::Ramp {
            start: 20,
            step: -2,
            every: 3,
        };
        let v: Vec<Temperature> = (0..7).map(|t| p.at(t)).collect();
        assert_eq!(v, [20, 20, 20, 18, 18, 18, 16]);
    }

    #[test]
    fn ramp_saturates() {
        let p = TemperatureProfile::Ramp {
            start: Temperature::MAX - 1,
            step: 10,
            every: 1,
        };
        assert_eq!(p.at(u64::MAX), Temperature::MAX);
    }

    #[test]
    fn trace_holds_last_value() {
        let p = TemperatureProfile::Trace(vec![1, 2, 3]);
        assert_eq!(p.at(1), 2);
        assert_eq!(p.at(100), 3);
        assert_eq!(TemperatureProfile::Trace(Vec::new()).at(0), 0);
    }
}
