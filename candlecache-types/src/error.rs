use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candlecache workspace.
///
/// This covers batch validation failures, upstream source failures, invalid
/// configuration, invalid query arguments, deadlines, and use-after-dispose.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheError {
    /// A candle batch was rejected as a whole (e.g. an element lacks a timestamp).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The external candle source failed while backfilling.
    #[error("{source_name} failed: {msg}")]
    Upstream {
        /// Name of the source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The cache could not be constructed with the supplied configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Invalid query argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Label of the operation that timed out (e.g. "backfill").
        capability: String,
    },

    /// The cache has been disposed and can no longer be used.
    #[error("cache has been disposed")]
    Disposed,
}

impl CacheError {
    /// Helper: build an `Upstream` error with the source name and message.
    pub fn upstream(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Returns `true` if this error originated from the external source.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
