//! Parsers for `/proc` counter files.
//!
//! These are pure functions that turn the text of one counter file into a raw
//! sample. They never substitute zero for a field they could not find: a layout
//! mismatch is reported as a [`ParseError`].

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============ /proc/stat ============

/// Aggregate CPU time buckets from the `cpu` line of `/proc/stat`, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Ticks spent doing nothing: idle plus waiting on I/O.
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    /// Ticks spent running something.
    pub fn active_total(&self) -> u64 {
        [self.nice, self.system, self.irq, self.softirq, self.steal]
            .into_iter()
            .fold(self.user, u64::saturating_add)
    }

    pub fn total(&self) -> u64 {
        self.idle_total().saturating_add(self.active_total())
    }
}

/// Number of time buckets read from the aggregate `cpu` line.
const CPU_BUCKETS: usize = 8;

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Format: `cpu  user nice system idle iowait irq softirq steal [guest guest_nice]`.
/// Per-core `cpuN` lines are ignored.
pub fn parse_cpu_times(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("no aggregate cpu line"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(CPU_BUCKETS)
        .map_while(|s| s.parse().ok())
        .collect();

    if values.len() < CPU_BUCKETS {
        return Err(ParseError::new(format!(
            "not enough fields in cpu line: expected {}, got {}",
            CPU_BUCKETS,
            values.len()
        )));
    }

    Ok(CpuTimes {
        user: values[0],
        nice: values[1],
        system: values[2],
        idle: values[3],
        iowait: values[4],
        irq: values[5],
        softirq: values[6],
        steal: values[7],
    })
}

/// Parses a single-value line of `/proc/stat`, such as `ctxt 500000` or
/// `procs_running 2`.
pub fn parse_stat_counter(content: &str, key: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some(key) {
            continue;
        }
        return parts
            .next()
            .ok_or_else(|| ParseError::new(format!("missing value for {}", key)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", key)));
    }

    Err(ParseError::new(format!("no {} line", key)))
}

// ============ /proc/meminfo ============

/// Total and available memory from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_available: u64,
}

/// Parses `MemTotal` and `MemAvailable` from `/proc/meminfo`.
///
/// Scanning stops as soon as both lines have been seen.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let parse_kb = |line: &str, name: &str| -> Result<u64, ParseError> {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ParseError::new(format!("invalid {}", name)))
    };

    let mut total = None;
    let mut available = None;

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            total = Some(parse_kb(line, "MemTotal")?);
        } else if line.starts_with("MemAvailable:") {
            available = Some(parse_kb(line, "MemAvailable")?);
        }
        if total.is_some() && available.is_some() {
            break;
        }
    }

    match (total, available) {
        (Some(mem_total), Some(mem_available)) => Ok(MemInfo {
            mem_total,
            mem_available,
        }),
        (None, _) => Err(ParseError::new("no MemTotal line")),
        (_, None) => Err(ParseError::new("no MemAvailable line")),
    }
}

// ============ Traffic totals ============

/// Cumulative traffic summed over every device of one counter source.
///
/// For block devices `inbound` is sectors read and `outbound` sectors written;
/// for network interfaces they are bytes received and bytes transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficTotals {
    pub inbound: u64,
    pub outbound: u64,
}

impl TrafficTotals {
    pub fn total(&self) -> u64 {
        self.inbound.saturating_add(self.outbound)
    }

    fn accumulate(&mut self, inbound: u64, outbound: u64) {
        self.inbound = self.inbound.saturating_add(inbound);
        self.outbound = self.outbound.saturating_add(outbound);
    }
}

/// Parses `/proc/diskstats` and sums sectors read and written over all devices.
///
/// Format: `major minor name reads r_merged r_sectors r_time writes w_merged w_sectors ...`.
/// Lines that do not match the layout are skipped; if none match the whole file
/// is rejected.
pub fn parse_diskstats(content: &str) -> Result<TrafficTotals, ParseError> {
    let mut totals = TrafficTotals::default();
    let mut devices = 0usize;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }

        let ids_valid = parts[0].parse::<u32>().is_ok() && parts[1].parse::<u32>().is_ok();
        let read_sectors = parts[5].parse::<u64>();
        let write_sectors = parts[9].parse::<u64>();

        if let (true, Ok(read), Ok(write)) = (ids_valid, read_sectors, write_sectors) {
            totals.accumulate(read, write);
            devices += 1;
        }
    }

    if devices == 0 {
        return Err(ParseError::new("no block device lines"));
    }

    Ok(totals)
}

/// Parses `/proc/net/dev` and sums bytes received and transmitted over all
/// interfaces.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
pub fn parse_net_dev(content: &str) -> Result<TrafficTotals, ParseError> {
    let mut totals = TrafficTotals::default();
    let mut interfaces = 0usize;

    for line in content.lines() {
        // Skip header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((_interface, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 9 {
            continue;
        }

        if let (Ok(rx), Ok(tx)) = (values[0].parse::<u64>(), values[8].parse::<u64>()) {
            totals.accumulate(rx, tx);
            interfaces += 1;
        }
    }

    if interfaces == 0 {
        return Err(ParseError::new("no interface lines"));
    }

    Ok(totals)
}
