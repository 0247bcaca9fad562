//! Structured errors for the channel layer.

use serde::{Deserialize, Serialize};

/// A structured error reported by a realtime channel, or derived from one.
///
/// Carries a stable numeric code, an HTTP-like status code, a human-readable
/// message, and an optional cause forming a chain back to the originating
/// failure. The cause is reachable through [`std::error::Error::source`] as
/// well as [`ErrorInfo::cause`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code: {code})")]
pub struct ErrorInfo {
    /// Stable numeric error code.
    pub code: u32,

    /// HTTP-like status code: 400 range for caller mistakes, 500 range for
    /// failures of the service or its channels.
    pub status_code: u16,

    /// Human-readable description.
    pub message: String,

    /// The underlying error that led to this one, if any.
    #[source]
    pub cause: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    /// Creates an error with no cause.
    pub fn new(code: u32, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            status_code,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches an underlying cause.
    pub fn with_cause(mut self, cause: ErrorInfo) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The underlying error that led to this one, if any.
    pub fn cause(&self) -> Option<&ErrorInfo> {
        self.cause.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message_and_code() {
        let error = ErrorInfo::new(40_000, 400, "bad request");
        assert_eq!(error.to_string(), "bad request (code: 40000)");
    }

    #[test]
    fn test_cause_chain() {
        let root = ErrorInfo::new(50_001, 500, "connection dropped");
        let wrapped = ErrorInfo::new(50_000, 500, "channel failed").with_cause(root.clone());

        assert_eq!(wrapped.cause(), Some(&root));
        assert!(std::error::Error::source(&wrapped).is_some());
    }

    #[test]
    fn test_no_cause_by_default() {
        let error = ErrorInfo::new(1, 500, "whatever");
        assert_eq!(error.cause(), None);
        assert!(std::error::Error::source(&error).is_none());
    }
}
