use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error taxonomy surfaced through the uniform error envelope
/// `{ statusCode, message, success: false, errors: [] }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed ID or missing field.
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    /// Ownership or role violation.
    #[error("{0}")]
    Forbidden(String),
    /// Missing/invalid credentials, and the tweet mutation gate.
    #[error("{0}")]
    Unauthorized(String),
    /// Duplicate relation. Maps to 400, not 409.
    #[error("{0}")]
    Conflict(String),
    /// Media store failure.
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal details are logged, never sent to the client.
    fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!("internal error: {err:#}");
        }

        let status = self.status();
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "message": self.public_message(),
            "success": false,
            "errors": [],
        });
        (status, Json(body)).into_response()
    }
}

/// Runs persistence work off the async runtime; rusqlite calls must not
/// block a tokio worker.
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {e}")))?
        .map_err(ApiError::Internal)
}

/// Parses a path or query identifier; malformed input surfaces as the
/// resource-specific "Invalid … ID" message rather than a bare 400.
pub(crate) fn parse_id(value: &str, message: &str) -> ApiResult<Uuid> {
    value
        .parse::<Uuid>()
        .map_err(|_| ApiError::InvalidArgument(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::upstream("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection pool exploded"));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn parse_id_maps_to_invalid_argument() {
        assert!(parse_id("b2c6e6c2-9a91-4b51-a2f8-8f0f56bfa0f4", "Invalid video ID").is_ok());
        match parse_id("not-a-uuid", "Invalid video ID") {
            Err(ApiError::InvalidArgument(msg)) => assert_eq!(msg, "Invalid video ID"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }
}
