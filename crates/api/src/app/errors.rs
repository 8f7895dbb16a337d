use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use decorshop_auth::AuthzError;
use decorshop_core::DomainError;
use decorshop_infra::{ServiceError, StoreError};

/// Every failure a handler can return.
///
/// `Internal` carries detail for the log only; clients see a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        match self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                json_error(status, code, "internal server error")
            }
            other => json_error(status, code, other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound("not found".into()),
            DomainError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            ServiceError::Store(e) => e.into(),
            ServiceError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::NotFound(err.to_string())
            }
            ServiceError::Format { .. } => Self::Validation(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases = [
            (ApiError::from(DomainError::validation("bad")), StatusCode::BAD_REQUEST),
            (DomainError::not_found().into(), StatusCode::NOT_FOUND),
            (DomainError::conflict("again").into(), StatusCode::CONFLICT),
            (StoreError::Storage("disk".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthzError::Forbidden("x".into()).into(), StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::Internal("connection refused to 10.0.0.5".into());
        assert_eq!(err.status_and_code().1, "internal_error");
        assert!(err.to_string().contains("10.0.0.5"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
