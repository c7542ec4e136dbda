//! Pre-built mock `/proc` trees for testing.

use super::filesystem::MockFs;

/// `/proc/stat` of a four-core machine that has been up for a while.
pub const TYPICAL_STAT: &str = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
";

/// `/proc/meminfo` with 16 GB total and 12 GB available.
pub const TYPICAL_MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
";

/// `/proc/diskstats` with a SATA disk, one partition and an NVMe drive.
pub const TYPICAL_DISKSTATS: &str = "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
";

/// `/proc/net/dev` with loopback and one ethernet interface.
pub const TYPICAL_NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
";

impl MockFs {
    /// Creates a `/proc` tree with every counter source present and well formed.
    pub fn typical_system() -> Self {
        let fs = Self::new();
        fs.add_file("/proc/stat", TYPICAL_STAT);
        fs.add_file("/proc/meminfo", TYPICAL_MEMINFO);
        fs.add_file("/proc/diskstats", TYPICAL_DISKSTATS);
        fs.add_file("/proc/net/dev", TYPICAL_NET_DEV);
        fs
    }

    /// Creates a `/proc` tree of a freshly booted machine with no disk or
    /// network traffic yet.
    pub fn idle_system() -> Self {
        let fs = Self::new();
        fs.add_file(
            "/proc/stat",
            "cpu  0 0 0 100 0 0 0 0 0 0\nctxt 0\nprocs_running 1\n",
        );
        fs.add_file(
            "/proc/meminfo",
            "MemTotal:        2048000 kB\nMemAvailable:    2048000 kB\n",
        );
        fs.add_file(
            "/proc/diskstats",
            "   8       0 sda 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
        );
        fs.add_file(
            "/proc/net/dev",
            "Inter-|   Receive |  Transmit\n face |bytes packets|bytes packets\n    lo: 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n",
        );
        fs
    }
}
