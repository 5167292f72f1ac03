//! Convenience result type alias for Cube.

use crate::error::AppError;

/// A specialized `Result` type for Cube operations.
pub type AppResult<T> = Result<T, AppError>;
