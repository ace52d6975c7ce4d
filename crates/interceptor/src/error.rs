//! Errors raised while gathering diagnostic data around an intercepted call.
//!
//! These never reach the caller of the intercepted call; hooks log them at
//! warn level and carry on.

use thiserror::Error;

/// Auxiliary interception failure
#[derive(Debug, Error)]
pub enum InterceptError {
    /// A request header could not be read as visible ASCII
    #[error("invalid value for header '{name}': {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::ToStrError,
    },
}

impl InterceptError {
    pub(crate) fn invalid_header(name: impl Into<String>, source: http::header::ToStrError) -> Self {
        Self::InvalidHeaderValue {
            name: name.into(),
            source,
        }
    }
}
