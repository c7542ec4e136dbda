//! Per-family sampling pipeline: read the counter source, turn the raw sample
//! into a value, publish it.
//!
//! One family's failure never stops the others. A failed family keeps its last
//! published value in the registry.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::collector::procfs::SystemCollector;
use crate::collector::traits::FileSystem;
use crate::error::SampleError;
use crate::rates::{CpuRateState, TrafficRateState, memory_usage_percent};
use crate::registry::{MetricFamily, Registry};

/// Outcome of one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Families whose value was published, in sampling order.
    pub updated: Vec<MetricFamily>,
    /// Families left at their previous value and why.
    pub failed: Vec<(MetricFamily, SampleError)>,
}

/// Reads every metric family and owns the previous-sample state of the
/// cumulative ones.
pub struct Sampler<F: FileSystem> {
    collector: SystemCollector<F>,
    cpu: CpuRateState,
    disk: TrafficRateState,
    net: TrafficRateState,
}

impl<F: FileSystem> Sampler<F> {
    /// Creates a sampler reading from `proc_path` (usually "/proc").
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            collector: SystemCollector::new(fs, proc_path),
            cpu: CpuRateState::default(),
            disk: TrafficRateState::default(),
            net: TrafficRateState::default(),
        }
    }

    /// Reads one family and computes its current value.
    ///
    /// Rate state is only touched once the source has been read and parsed.
    pub fn sample(&mut self, family: MetricFamily) -> Result<f64, SampleError> {
        match family {
            MetricFamily::CpuUsage => {
                let times = self.collector.read_cpu_times()?;
                self.cpu.update(times)
            }
            MetricFamily::MemoryUsage => memory_usage_percent(self.collector.read_memory()?),
            MetricFamily::DiskIoUsage => {
                let totals = self.collector.read_disk_totals()?;
                Ok(self.disk.update(totals))
            }
            MetricFamily::NetworkUsage => {
                let totals = self.collector.read_net_totals()?;
                Ok(self.net.update(totals))
            }
            MetricFamily::RunningProcesses => Ok(self.collector.read_procs_running()? as f64),
            MetricFamily::ContextSwitches => Ok(self.collector.read_context_switches()? as f64),
        }
    }

    /// Samples every family in fixed order and publishes each successful value.
    pub fn tick(&mut self, registry: &Registry) -> TickReport {
        let mut report = TickReport::default();

        for family in MetricFamily::ALL {
            match self.sample(family) {
                Ok(value) => {
                    registry.set(family, value);
                    debug!(family = family.name(), value, "metric updated");
                    report.updated.push(family);
                }
                Err(e) => {
                    warn!(
                        family = family.name(),
                        kind = e.kind(),
                        error = %e,
                        "sample failed, keeping previous value"
                    );
                    report.failed.push((family, e));
                }
            }
        }

        report
    }
}
