//! Counters accumulated by the polling loop.

use crate::poller::TickReport;
use crate::status::Phase;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    pub ticks: u64,
    /// Commands the peripheral accepted.
    pub accepted: u64,
    /// Commands the peripheral rejected, transport faults included.
    pub rejected: u64,
    pub transport_faults: u64,
    pub successful_reads: u64,
    /// Times the driver fell back to resetting after having left it.
    pub recoveries: u64,
    /// Longest run of consecutive ticks spent resetting.
    pub longest_outage: u64,
    /// Tick at which `temp_ever_valid` first became true.
    pub first_valid_tick: Option<u64>,
    /// Paced ticks that started later than one full period behind schedule.
    pub overruns: u64,
    current_outage: u64,
}

impl PollStats {
    pub fn record(&mut self, report: &TickReport) {
        self.ticks = self.ticks.saturating_add(1);
        if report.answered.cmd_ok {
            self.accepted = self.accepted.saturating_add(1);
        } else {
            self.rejected = self.rejected.saturating_add(1);
        }
        if report.fault.is_some() {
            self.transport_faults = self.transport_faults.saturating_add(1);
        }
        if report.telemetry.last_read_success {
            self.successful_reads = self.successful_reads.saturating_add(1);
        }
        if report.telemetry.temp_ever_valid && self.first_valid_tick.is_none() {
            self.first_valid_tick = Some(report.tick);
        }

        if report.phase == Phase::Resetting {
            if report.prev_phase != Phase::Resetting {
                self.recoveries = self.recoveries.saturating_add(1);
            }
            self.current_outage = self.current_outage.saturating_add(1);
            self.longest_outage = self.longest_outage.max(self.current_outage);
        } else {
            self.current_outage = 0;
        }
    }

    /// Fraction of ticks that produced a successful read, in [0, 1].
    pub fn read_ratio(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.successful_reads as f64 / self.ticks as f64
        }
    }
}
