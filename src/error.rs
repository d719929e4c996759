//! Error types for the info gateway

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::api::ALLOW_HEADER_VALUE;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No backend node could be chosen for a node class
    #[error("node resolution error: {0}")]
    NodeResolution(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing error
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

/// Request-level failures of the info endpoint
///
/// Malformed, expired and forged admin signatures all collapse into
/// [`InfoError::Unauthorized`] so callers cannot tell which check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoError {
    /// Info disclosure is disabled for this deployment
    #[error("info disclosure is disabled")]
    Forbidden,

    /// Admin capability is missing, invalid or expired
    #[error("unauthorized")]
    Unauthorized,

    /// Only GET and HEAD are served
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The extended info fetch exhausted its attempt budget
    #[error("extended info unavailable")]
    ExtendedInfoUnavailable,
}

impl InfoError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ExtendedInfoUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::ExtendedInfoUnavailable => "extended_info_unavailable",
        }
    }
}

impl IntoResponse for InfoError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let body = Json(ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        });

        if self == Self::MethodNotAllowed {
            return (
                self.status(),
                [(header::ALLOW, ALLOW_HEADER_VALUE)],
                body,
            )
                .into_response();
        }

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(InfoError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(InfoError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            InfoError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            InfoError::ExtendedInfoUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn method_not_allowed_lists_allowed_methods() {
        let response = InfoError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            ALLOW_HEADER_VALUE
        );
    }

    #[test]
    fn unauthorized_has_no_allow_header() {
        let response = InfoError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::ALLOW).is_none());
    }
}
