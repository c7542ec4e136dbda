//! Rate computation for cumulative kernel counters.
//!
//! Each cumulative metric family owns one rate state holding exactly one
//! previous sample. The sampler only calls `update` after a successful parse,
//! so a tick whose source could not be read leaves the baseline untouched and
//! the next good tick computes its delta against the last good sample.

use crate::collector::procfs::{CpuTimes, MemInfo, TrafficTotals};
use crate::error::SampleError;

// ---------------------------------------------------------------------------
// Delta helpers
// ---------------------------------------------------------------------------

/// Compute u64 delta, returning `None` on counter regression (counter reset).
pub fn du64(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// `part / whole` as a percentage. Caller guarantees `whole > 0`.
fn percent(part: u64, whole: u64) -> f64 {
    part as f64 / whole as f64 * 100.0
}

// ---------------------------------------------------------------------------
// CPU
// ---------------------------------------------------------------------------

/// Rate tracking state for aggregate CPU usage.
///
/// Starts from the zero sample, so the first reading reports the average
/// usage since boot.
#[derive(Debug, Default)]
pub struct CpuRateState {
    pub prev_sample: CpuTimes,
}

impl CpuRateState {
    /// Records `sample` as the new baseline and returns the busy percentage
    /// of the ticks elapsed since the previous sample.
    ///
    /// If the idle or active tick totals went backwards the new sample becomes
    /// the baseline and this tick has no value. If no ticks elapsed, or the
    /// elapsed ticks do not fit in a `u64`, the value
    /// is undefined as well.
    pub fn update(&mut self, sample: CpuTimes) -> Result<f64, SampleError> {
        let prev = std::mem::replace(&mut self.prev_sample, sample);

        let idle = du64(sample.idle_total(), prev.idle_total());
        let active = du64(sample.active_total(), prev.active_total());
        let (Some(idle_delta), Some(active_delta)) = (idle, active) else {
            return Err(SampleError::ComputationUndefined(
                "cpu counters went backwards",
            ));
        };

        let total_delta = idle_delta.checked_add(active_delta).ok_or(
            SampleError::ComputationUndefined("cpu tick delta overflows u64"),
        )?;
        if total_delta == 0 {
            return Err(SampleError::ComputationUndefined("no cpu time elapsed"));
        }

        Ok(percent(total_delta - idle_delta, total_delta))
    }
}

// ---------------------------------------------------------------------------
// Disk / network
// ---------------------------------------------------------------------------

/// Rate tracking state for disk sectors or network bytes.
///
/// The reported value is the traffic since the previous sample as a share of
/// the current cumulative total, which is not a utilization of device
/// capacity. A component that went backwards contributes zero to the delta.
#[derive(Debug, Default)]
pub struct TrafficRateState {
    pub prev_sample: TrafficTotals,
}

impl TrafficRateState {
    /// Records `sample` as the new baseline and returns the traffic share.
    ///
    /// Returns 0 when the current total is 0.
    pub fn update(&mut self, sample: TrafficTotals) -> f64 {
        let prev = std::mem::replace(&mut self.prev_sample, sample);

        let delta = du64(sample.inbound, prev.inbound)
            .unwrap_or(0)
            .saturating_add(du64(sample.outbound, prev.outbound).unwrap_or(0));

        match sample.total() {
            0 => 0.0,
            total => percent(delta, total),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Share of memory in use: `(total - available) / total`.
///
/// Not delta-based. Both operands must be non-zero.
pub fn memory_usage_percent(info: MemInfo) -> Result<f64, SampleError> {
    if info.mem_total == 0 || info.mem_available == 0 {
        return Err(SampleError::ComputationUndefined(
            "memory total or available is zero",
        ));
    }
    let used = info.mem_total.saturating_sub(info.mem_available);
    Ok(percent(used, info.mem_total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(user: u64, system: u64, idle: u64, iowait: u64) -> CpuTimes {
        CpuTimes {
            user,
            system,
            idle,
            iowait,
            ..Default::default()
        }
    }

    fn traffic(inbound: u64, outbound: u64) -> TrafficTotals {
        TrafficTotals { inbound, outbound }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn du64_regression_yields_none() {
        assert_eq!(du64(10, 4), Some(6));
        assert_eq!(du64(4, 4), Some(0));
        assert_eq!(du64(3, 4), None);
    }

    #[test]
    fn cpu_first_sample_is_usage_since_boot() {
        let mut state = CpuRateState::default();
        // 300 active of 1000 total ticks.
        assert_close(state.update(cpu(200, 100, 600, 100)).unwrap(), 30.0);
        assert_eq!(state.prev_sample, cpu(200, 100, 600, 100));
    }

    #[test]
    fn cpu_usage_from_delta() {
        let mut state = CpuRateState::default();
        state.update(cpu(200, 100, 600, 100)).unwrap();
        // +150 active, +50 idle, +0 iowait
        let usage = state.update(cpu(300, 150, 650, 100)).unwrap();
        assert_close(usage, 75.0);
    }

    #[test]
    fn cpu_iowait_counts_as_idle() {
        let mut state = CpuRateState::default();
        state.update(cpu(0, 0, 0, 0)).unwrap_err();
        let usage = state.update(cpu(10, 0, 0, 90)).unwrap();
        assert_close(usage, 10.0);
    }

    #[test]
    fn cpu_identical_samples_are_undefined() {
        let mut state = CpuRateState::default();
        let sample = cpu(500, 200, 3000, 50);
        state.update(sample).unwrap();

        match state.update(sample) {
            Err(SampleError::ComputationUndefined(reason)) => {
                assert_eq!(reason, "no cpu time elapsed")
            }
            other => panic!("expected ComputationUndefined, got {:?}", other),
        }
        assert_eq!(state.prev_sample, sample);
    }

    #[test]
    fn cpu_usage_stays_in_range() {
        let mut state = CpuRateState::default();
        let samples = [
            cpu(10, 5, 100, 1),
            cpu(10, 5, 200, 1),
            cpu(110, 5, 200, 1),
            cpu(150, 60, 230, 40),
            cpu(151, 61, 231, 41),
        ];
        for sample in samples {
            let usage = state.update(sample).unwrap();
            assert!((0.0..=100.0).contains(&usage), "usage {usage} out of range");
        }
    }

    #[test]
    fn cpu_delta_overflow_is_undefined() {
        let mut state = CpuRateState::default();
        let huge = cpu(u64::MAX, 0, u64::MAX, 0);

        let err = state.update(huge).unwrap_err();
        assert!(matches!(err, SampleError::ComputationUndefined(_)));
        assert_eq!(state.prev_sample, huge);
    }

    #[test]
    fn cpu_regression_resets_baseline() {
        let mut state = CpuRateState::default();
        state.update(cpu(1000, 500, 8000, 500)).unwrap();

        // Counters restarted lower: no value, new baseline.
        let err = state.update(cpu(100, 50, 800, 50)).unwrap_err();
        assert!(matches!(
            err,
            SampleError::ComputationUndefined("cpu counters went backwards")
        ));
        assert_eq!(state.prev_sample, cpu(100, 50, 800, 50));

        // Next tick measures against the reset baseline: +100 active, +100 idle.
        let usage = state.update(cpu(200, 50, 900, 50)).unwrap();
        assert_close(usage, 50.0);
    }

    #[test]
    fn memory_usage() {
        let usage = memory_usage_percent(MemInfo {
            mem_total: 8_000_000,
            mem_available: 2_000_000,
        })
        .unwrap();
        assert_eq!(usage, 75.0);
    }

    #[test]
    fn memory_zero_operands_are_undefined() {
        for (mem_total, mem_available) in [(0, 100), (100, 0), (0, 0)] {
            let result = memory_usage_percent(MemInfo {
                mem_total,
                mem_available,
            });
            assert!(matches!(result, Err(SampleError::ComputationUndefined(_))));
        }
    }

    #[test]
    fn memory_available_above_total_clamps_to_zero() {
        let usage = memory_usage_percent(MemInfo {
            mem_total: 100,
            mem_available: 150,
        })
        .unwrap();
        assert_eq!(usage, 0.0);
    }

    #[test]
    fn traffic_share_of_current_total() {
        let mut state = TrafficRateState::default();
        state.update(traffic(100, 50));
        // delta = 50 + 30 = 80 over a current total of 230
        let usage = state.update(traffic(150, 80));
        assert_close(usage, 34.78);
        assert_eq!(state.prev_sample, traffic(150, 80));
    }

    #[test]
    fn traffic_first_sample_is_full_share() {
        let mut state = TrafficRateState::default();
        assert_eq!(state.update(traffic(100, 50)), 100.0);
    }

    #[test]
    fn traffic_zero_total_is_zero() {
        let mut state = TrafficRateState::default();
        assert_eq!(state.update(traffic(0, 0)), 0.0);
        assert_eq!(state.update(traffic(0, 0)), 0.0);
    }

    #[test]
    fn traffic_no_change_is_zero() {
        let mut state = TrafficRateState::default();
        state.update(traffic(400, 600));
        assert_eq!(state.update(traffic(400, 600)), 0.0);
    }

    #[test]
    fn traffic_regression_clamps_component() {
        let mut state = TrafficRateState::default();
        state.update(traffic(100, 50));

        // inbound dropped 100 -> 40 (device removed): contributes 0, outbound +30.
        let usage = state.update(traffic(40, 80));
        assert_eq!(usage, 25.0);
        assert_eq!(state.prev_sample, traffic(40, 80));

        // And the reduced totals are the new baseline.
        let usage = state.update(traffic(60, 80));
        assert_close(usage, 14.29);
    }
}
