//! Gateway and validation errors.

use thiserror::Error;

/// Errors raised while building a message or interpreting a gateway reply.
///
/// Transient gateway failures (5xx, per-recipient `Unavailable`) are not
/// errors; they show up as retryable recipients in a
/// [`Partition`](crate::classify::Partition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcmError {
    /// Empty or oversized recipient list, wrong-arity unicast target, bad option value.
    #[error("validation error: {0}")]
    Validation(String),
    /// HTTP 401: the API key was rejected.
    #[error("authentication error: API key rejected by gateway")]
    Authentication,
    /// HTTP 400: the gateway rejected the request; holds its diagnostic body.
    #[error("request rejected by gateway: {0}")]
    RequestRejected(String),
    /// Any status outside 200, 400, 401 and 500-599.
    #[error("unknown status code: {0}")]
    UnknownStatus(u32),
    /// HTTP 200 whose body does not match the expected shape.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl GcmError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        GcmError::Validation(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        GcmError::MalformedResponse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_is_neutral() {
        let err = GcmError::validation("API key is required");
        assert_eq!(err.to_string(), "validation error: API key is required");
    }
}
