//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CvError` as one
//! variant via `#[from]`, so configuration problems surface unchanged at the
//! driver level.

use thiserror::Error;

/// The error type for `cv-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CvError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `cv-core`.
pub type CvResult<T> = Result<T, CvError>;
