//! Readers for the Linux `/proc` filesystem.
//!
//! `parser` holds the pure text parsers; `system` resolves paths under the proc
//! root, performs the reads and classifies failures.

pub mod parser;
pub mod system;

pub use parser::{CpuTimes, MemInfo, ParseError, TrafficTotals};
pub use system::SystemCollector;
