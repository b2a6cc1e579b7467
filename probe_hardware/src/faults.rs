//! Havoc schedules for the simulated sensor.

use std::str::FromStr;

use crate::error::{Result, SimError};

/// Half-open tick range `[start, end)` during which havoc is asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HavocWindow {
    pub start: u64,
    pub end: u64,
}

impl HavocWindow {
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end <= start {
            return Err(SimError::EmptyWindow(format!("{start}..{end}")));
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn contains(&self, tick: u64) -> bool {
        (self.start..self.end).contains(&tick)
    }
}

/// Parses `START..END` (half-open) or a single `TICK`.
impl FromStr for HavocWindow {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| SimError::InvalidWindow(s.to_string()))
        };
        match s.split_once("..") {
            Some((a, b)) => {
                let (start, end) = (parse(a)?, parse(b)?);
                if end <= start {
                    return Err(SimError::EmptyWindow(s.to_string()));
                }
                Ok(Self { start, end })
            }
            None => {
                let t = parse(s)?;
                Ok(Self {
                    start: t,
                    end: t.saturating_add(1),
                })
            }
        }
    }
}

/// When havoc is asserted over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    windows: Vec<HavocWindow>,
    /// (period, length): havoc on the first `length` ticks of every period.
    burst: Option<(u64, u64)>,
}

impl FaultPlan {
    /// A plan that never fails the device.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_windows(windows: impl IntoIterator<Item = HavocWindow>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
            burst: None,
        }
    }

    pub fn with_window(mut self, window: HavocWindow) -> Self {
        self.windows.push(window);
        self
    }

    /// Add periodic havoc. Ticks `k*period .. k*period + length` fail.
    pub fn with_burst(mut self, period: u64, length: u64) -> Result<Self> {
        if length == 0 || length >= period {
            return Err(SimError::InvalidBurst { period, length });
        }
        self.burst = Some((period, length));
        Ok(self)
    }

    pub fn is_havoc(&self, tick: u64) -> bool {
        if self.windows.iter().any(|w| w.contains(tick)) {
            return true;
        }
        match self.burst {
            Some((period, length)) => tick % period < length,
            None => false,
        }
    }

    pub fn windows(&self) -> &[HavocWindow] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_and_single_ticks() {
        assert_eq!(
            "3..6".parse::<HavocWindow>(),
            Ok(HavocWindow { start: 3, end: 6 })
        );
        assert_eq!(
            " 9 ".parse::<HavocWindow>(),
            Ok(HavocWindow { start: 9, end: 10 })
        );
    }

    #[test]
    fn rejects_bad_windows() {
        assert!(matches!(
            "x..4".parse::<HavocWindow>(),
            Err(SimError::InvalidWindow(_))
        ));
        assert!(matches!(
            "4..4".parse::<HavocWindow>(),
            Err(SimError::EmptyWindow(_))
        ));
        assert!(HavocWindow::new(5, 2).is_err());
    }

    #[test]
    fn windows_are_half_open() {
        let plan = FaultPlan::none().with_window(HavocWindow { start: 2, end: 4 });
        let hits: Vec<u64> = (0..6).filter(|&t| plan.is_havoc(t)).collect();
        assert_eq!(hits, [2, 3]);
    }

    #[test]
    fn bursts_repeat() {
        let plan = FaultPlan::none().with_burst(5, 2).expect("valid burst");
        let hits: Vec<u64> = (0..12).filter(|&t| plan.is_havoc(t)).collect();
        assert_eq!(hits, [0, 1, 5, 6, 10, 11]);
    }

    #[test]
    fn burst_must_leave_room_to_recover() {
        assert_eq!(
            FaultPlan::none().with_burst(3, 3),
            Err(SimError::InvalidBurst {
                period: 3,
                length: 3
            })
        );
    }
}
