//! Counter source readers for Linux.
//!
//! Reads system-wide counters from the `/proc` filesystem through a
//! [`FileSystem`] seam, so the same readers run against an in-memory tree in
//! tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │             SystemCollector              │
//! │  - /proc/stat       (cpu, procs, ctxt)   │
//! │  - /proc/meminfo                         │
//! │  - /proc/diskstats                       │
//! │  - /proc/net/dev                         │
//! └────────────────────┬─────────────────────┘
//!                      │
//!               ┌──────▼──────┐
//!               │  FileSystem │ (trait)
//!               └──────┬──────┘
//!              ┌───────┴────────┐
//!       ┌──────▼──────┐  ┌──────▼──────┐
//!       │   RealFs    │  │   MockFs    │
//!       │  (Linux)    │  │  (Testing)  │
//!       └─────────────┘  └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use procgauge_core::collector::{MockFs, SystemCollector};
//!
//! let collector = SystemCollector::new(MockFs::typical_system(), "/proc");
//! let cpu = collector.read_cpu_times().unwrap();
//! assert!(cpu.total() > 0);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::SystemCollector;
pub use traits::{FileSystem, RealFs};
