//! Counter source reader for the system-wide files under `/proc`.

use std::path::{Path, PathBuf};

use crate::collector::procfs::parser::{
    CpuTimes, MemInfo, ParseError, TrafficTotals, parse_cpu_times, parse_diskstats,
    parse_meminfo, parse_net_dev, parse_stat_counter,
};
use crate::collector::traits::FileSystem;
use crate::error::SampleError;

/// Reads and parses system-wide counter files.
///
/// Stateless: every call re-reads its source.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    pub fn proc_path(&self) -> &Path {
        &self.proc_path
    }

    /// Reads the aggregate CPU time buckets from `/proc/stat`.
    pub fn read_cpu_times(&self) -> Result<CpuTimes, SampleError> {
        self.read_parsed("stat", parse_cpu_times)
    }

    /// Reads total and available memory from `/proc/meminfo`.
    pub fn read_memory(&self) -> Result<MemInfo, SampleError> {
        self.read_parsed("meminfo", parse_meminfo)
    }

    /// Reads sectors read/written summed over all block devices.
    pub fn read_disk_totals(&self) -> Result<TrafficTotals, SampleError> {
        self.read_parsed("diskstats", parse_diskstats)
    }

    /// Reads bytes received/transmitted summed over all interfaces.
    pub fn read_net_totals(&self) -> Result<TrafficTotals, SampleError> {
        self.read_parsed("net/dev", parse_net_dev)
    }

    /// Reads the number of runnable processes from `/proc/stat`.
    pub fn read_procs_running(&self) -> Result<u64, SampleError> {
        self.read_parsed("stat", |content| {
            parse_stat_counter(content, "procs_running")
        })
    }

    /// Reads the context switch count since boot from `/proc/stat`.
    pub fn read_context_switches(&self) -> Result<u64, SampleError> {
        self.read_parsed("stat", |content| parse_stat_counter(content, "ctxt"))
    }

    fn read_parsed<T>(
        &self,
        relative: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, SampleError> {
        let path = self.proc_path.join(relative);
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|source| SampleError::SourceUnavailable {
                path: path.clone(),
                source,
            })?;
        parse(&content).map_err(|e| SampleError::ParseIncomplete {
            path,
            message: e.message,
        })
    }
}
