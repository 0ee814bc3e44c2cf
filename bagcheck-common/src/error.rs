//! Common error types for bagcheck

use thiserror::Error;

/// Common result type for bagcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across bagcheck services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
