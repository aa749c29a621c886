//! Shared core types and errors

pub mod error;
pub mod types;

pub use error::{ProductionError, Result, SimError};
pub use types::{InstanceId, PointId, Side, Tick};
