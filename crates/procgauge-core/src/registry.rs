//! Metric families and the registry shared by the sampler and the exposition
//! endpoint.
//!
//! The registry owns one Prometheus gauge per family behind a single mutex.
//! The sampler takes the lock for one `set` at a time; a scrape takes it for
//! one whole `snapshot` or `encode_text`. Counter files are never read while
//! the lock is held.

use std::fmt;
use std::string::FromUtf8Error;
use std::sync::{Mutex, MutexGuard, PoisonError};

use prometheus::{Encoder, Gauge, TextEncoder};
use thiserror::Error;

/// What a family's value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// A percentage in `[0, 100]`.
    Percent,
    /// A raw count, `>= 0`.
    Count,
}

/// One independently updated observable quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricFamily {
    CpuUsage,
    MemoryUsage,
    DiskIoUsage,
    NetworkUsage,
    RunningProcesses,
    ContextSwitches,
}

impl MetricFamily {
    /// Every family, in sampling order.
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::CpuUsage,
        MetricFamily::MemoryUsage,
        MetricFamily::DiskIoUsage,
        MetricFamily::NetworkUsage,
        MetricFamily::RunningProcesses,
        MetricFamily::ContextSwitches,
    ];

    /// Exposition name. Stable across releases.
    pub fn name(self) -> &'static str {
        match self {
            MetricFamily::CpuUsage => "cpu_usage_percentage",
            MetricFamily::MemoryUsage => "memory_usage_percentage",
            MetricFamily::DiskIoUsage => "io_disk_usage_percentage",
            MetricFamily::NetworkUsage => "red_usage_percentage",
            MetricFamily::RunningProcesses => "execution_process_number",
            MetricFamily::ContextSwitches => "context_switches",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricFamily::CpuUsage => "CPU busy time since the previous sample, in percent",
            MetricFamily::MemoryUsage => "Memory in use (total minus available), in percent",
            MetricFamily::DiskIoUsage => {
                "Sectors read and written since the previous sample as a share of all sectors transferred, in percent"
            }
            MetricFamily::NetworkUsage => {
                "Bytes received and transmitted since the previous sample as a share of all bytes transferred, in percent"
            }
            MetricFamily::RunningProcesses => "Number of processes in runnable state",
            MetricFamily::ContextSwitches => "Context switches since boot",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            MetricFamily::CpuUsage
            | MetricFamily::MemoryUsage
            | MetricFamily::DiskIoUsage
            | MetricFamily::NetworkUsage => Unit::Percent,
            MetricFamily::RunningProcesses | MetricFamily::ContextSwitches => Unit::Count,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Point-in-time copy of every family's value, in sampling order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Vec<(MetricFamily, f64)>,
}

impl Snapshot {
    pub fn get(&self, family: MetricFamily) -> Option<f64> {
        self.values
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricFamily, f64)> + '_ {
        self.values.iter().copied()
    }
}

struct Gauges {
    registry: prometheus::Registry,
    /// Indexed by `MetricFamily::index`.
    gauges: Vec<Gauge>,
}

/// Current value of every metric family.
pub struct Registry {
    inner: Mutex<Gauges>,
}

impl Registry {
    /// Registers one gauge per family, each starting at 0.
    pub fn new() -> Result<Self, RegistryError> {
        let registry = prometheus::Registry::new();
        let mut gauges = Vec::with_capacity(MetricFamily::ALL.len());

        for family in MetricFamily::ALL {
            let gauge = Gauge::new(family.name(), family.help())?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.push(gauge);
        }

        Ok(Self {
            inner: Mutex::new(Gauges { registry, gauges }),
        })
    }

    /// Publishes a new value for `family`.
    pub fn set(&self, family: MetricFamily, value: f64) {
        self.lock().gauges[family.index()].set(value);
    }

    pub fn get(&self, family: MetricFamily) -> f64 {
        self.lock().gauges[family.index()].get()
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        let values = MetricFamily::ALL
            .iter()
            .map(|&family| (family, inner.gauges[family.index()].get()))
            .collect();
        Snapshot { values }
    }

    /// Renders every family in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, RegistryError> {
        let families = self.lock().registry.gather();
        let mut buffer = Vec::with_capacity(1024);
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// A panic while holding the lock cannot leave a gauge half-written, so a
    /// poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Gauges> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
