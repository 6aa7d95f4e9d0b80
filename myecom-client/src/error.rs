use reqwest::StatusCode;
use shared::models::ErrorResponse;
use thiserror::Error;

use crate::guard::Capability;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures surfaced by the API client and the stores built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (DNS, connect, timeout, reset).
    #[error("network request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The server rejected the credentials or bearer token (401/403).
    #[error("unauthorized ({status}): {body}")]
    Unauthorized {
        status: StatusCode,
        body: ErrorResponse,
    },

    /// The identity fetch for the current token failed; the session was reset.
    #[error("session expired; log in again")]
    AuthExpired,

    /// The server refused the payload (400/422). `body` holds the field errors verbatim.
    #[error("validation failed: {body}")]
    Validation {
        status: StatusCode,
        body: ErrorResponse,
    },

    #[error("conflict: {0}")]
    Conflict(ErrorResponse),

    #[error("unexpected response {status}: {body}")]
    Unexpected {
        status: StatusCode,
        body: ErrorResponse,
    },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Config(#[from] shared::config::ConfigError),

    /// A newer token change overtook this operation; its result was dropped.
    #[error("session changed before the request completed")]
    Superseded,

    /// The current session lacks the capability an operation requires.
    #[error("forbidden: requires the {0} capability")]
    Forbidden(Capability),

    /// An operation needs a persisted refresh token and none is stored.
    #[error("no refresh token stored; log in again")]
    MissingRefreshToken,
}

impl ClientError {
    /// Classify a non-success response.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let body = ErrorResponse::from_body(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized { status, body },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation { status, body }
            }
            StatusCode::CONFLICT => Self::Conflict(body),
            _ => Self::Unexpected { status, body },
        }
    }

    /// `true` for failures that mean the caller must authenticate again.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::AuthExpired | Self::MissingRefreshToken
        )
    }

    /// Server-provided error body, for failures that carry one.
    #[must_use]
    pub const fn body(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Unauthorized { body, .. }
            | Self::Validation { body, .. }
            | Self::Unexpected { body, .. }
            | Self::Conflict(body) => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err)
    }
}
