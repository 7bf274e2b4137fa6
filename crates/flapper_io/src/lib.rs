//! # Flapper IO
//!
//! Persistence layer for training runs: structured errors and the
//! append-only generation history.

/// Error types and result aliases for I/O operations
pub mod error;
/// Generation history logging
pub mod history;

pub use error::{IoError, Result};
pub use history::{GenerationRecord, HistoryLogger};
