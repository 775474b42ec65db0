/// Core Module for DataTier
///
/// The database layer and the error types every operation reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DataTierError, DriverError, Result};
