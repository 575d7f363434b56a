//! Error types for the SnapFit client core.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! frequently distinguish "the resource does not exist" and "the session is
//! no longer valid" from "the server returned an unexpected status." All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body for debugging.
//!
//! Slot allocation has its own error type, generic over the provider's
//! error, so the allocator stays independent of the HTTP layer. When the
//! provider is the marketplace worker the two collapse back into `ApiError`
//! without losing the distinction between a failed call and an exhausted
//! retry budget.

use thiserror::Error;

/// Errors returned by the client, worker, and use-case layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401: the access token is missing or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned a non-2xx status other than 401 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server ran out of upload paths before enough were collected.
    #[error("not enough upload slots: requested {requested}, obtained {obtained}")]
    InsufficientSlots { requested: usize, obtained: usize },

    /// A configuration document could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Whether repeating the same request later could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::InsufficientSlots { .. } => true,
            ApiError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Failure of a [`SlotAllocator`](crate::allocator::SlotAllocator) chain.
#[derive(Debug, Error)]
pub enum AllocationError<E>
where
    E: std::error::Error + 'static,
{
    /// A provider call failed; the chain was aborted at that call.
    #[error("slot provider failed: {0}")]
    Provider(#[source] E),

    /// The retry budget ran out before `requested` slots were collected.
    /// Slots received along the way are dropped, only their count is kept.
    #[error("retry budget exhausted after {calls} calls: requested {requested}, obtained {obtained}")]
    InsufficientSlots {
        requested: usize,
        obtained: usize,
        calls: u32,
    },
}

impl From<AllocationError<ApiError>> for ApiError {
    fn from(err: AllocationError<ApiError>) -> Self {
        match err {
            AllocationError::Provider(inner) => inner,
            AllocationError::InsufficientSlots {
                requested, obtained, ..
            } => ApiError::InsufficientSlots {
                requested,
                obtained,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_collapses_to_inner_error() {
        let err: ApiError = AllocationError::Provider(ApiError::NotFound).into();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn exhausted_budget_keeps_counts_only() {
        let err: ApiError = AllocationError::<ApiError>::InsufficientSlots {
            requested: 5,
            obtained: 3,
            calls: 2,
        }
        .into();
        assert!(matches!(
            err,
            ApiError::InsufficientSlots {
                requested: 5,
                obtained: 3
            }
        ));
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = ApiError::HttpError {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());
        let err = ApiError::HttpError {
            status: 400,
            body: String::new(),
        };
        assert!(!err.is_retryable());
        assert!(!ApiError::NotFound.is_retryable());
    }

    #[test]
    fn slot_shortage_and_transport_failures_are_retryable() {
        assert!(ApiError::Transport("reset".to_string()).is_retryable());
        let err = ApiError::InsufficientSlots {
            requested: 3,
            obtained: 1,
        };
        assert!(err.is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
