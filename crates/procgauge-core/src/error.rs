//! Per-family sampling failures.
//!
//! Every variant is local to one metric family and one tick: the sampler logs
//! it, leaves the family's published value alone and moves on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    /// The counter file could not be opened or read.
    #[error("counter source {} unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but the expected lines or fields were not found.
    #[error("counter source {} incomplete: {message}", path.display())]
    ParseIncomplete { path: PathBuf, message: String },

    /// The sample was valid but no value can be derived from it this tick.
    #[error("value undefined: {0}")]
    ComputationUndefined(&'static str),
}

impl SampleError {
    /// Short machine-friendly name of the failure class, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SampleError::SourceUnavailable { .. } => "source_unavailable",
            SampleError::ParseIncomplete { .. } => "parse_incomplete",
            SampleError::ComputationUndefined(_) => "computation_undefined",
        }
    }
}
