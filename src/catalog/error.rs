//! Error types surfaced by the catalog client and stores.

use thiserror::Error;

/// Failure recorded in store state and propagated to direct callers.
///
/// All three kinds land in the same place (a store's `error` field); the
/// distinction matters for when they occur: validation failures
/// short-circuit before any request is sent or any cache is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
  /// Network-level failure before a server response could be read.
  #[error("request failed: {0}")]
  Transport(String),

  /// Non-2xx response, or an error code in the response envelope.
  #[error("server error ({status}): {message}")]
  Server { status: u16, message: String },

  /// Local pre-flight validation failure; nothing was sent.
  #[error("{0}")]
  Validation(String),
}

impl ApiError {
  pub fn is_validation(&self) -> bool {
    matches!(self, ApiError::Validation(_))
  }
}
