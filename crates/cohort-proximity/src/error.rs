//! Error types for cohort-proximity.

use thiserror::Error;

/// Result type for cohort-proximity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when configuring proximity computation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The radius is zero, negative, or not a finite number.
    #[error("invalid proximity radius {0}: must be a positive finite distance")]
    InvalidRadius(f64),
}
