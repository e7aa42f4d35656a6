//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CsError` as one variant
//! where configuration problems can surface.

use thiserror::Error;

/// The top-level error type for `cs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Shorthand result type for all `cs-*` crates.
pub type CsResult<T> = Result<T, CsError>;
