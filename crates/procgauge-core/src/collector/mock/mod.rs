//! Mock `/proc` filesystem and fixtures.

mod filesystem;
pub mod scenarios;

pub use filesystem::MockFs;
