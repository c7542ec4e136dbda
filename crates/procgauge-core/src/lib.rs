//! procgauge-core - sampling engine for the procgauge exporter.
//!
//! Provides:
//! - `collector` - counter source readers over `/proc` (real or mock)
//! - `rates` - previous-sample state and rate computation
//! - `registry` - metric families and the lock-guarded registry
//! - `sampler` - per-family read → compute → publish pipeline
//! - `scheduler` - fixed-cadence sampling thread
//! - `error` - per-family sampling failures

pub mod collector;
pub mod error;
pub mod rates;
pub mod registry;
pub mod sampler;
pub mod scheduler;

pub use error::SampleError;
pub use registry::{MetricFamily, Registry, RegistryError, Snapshot};
pub use sampler::{Sampler, TickReport};
pub use scheduler::{SAMPLE_INTERVAL, Scheduler, StopHandle};

/// Crate version, for startup logs and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
