//! Process-wide logging setup shared by every MediSupply service binary.

pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};
