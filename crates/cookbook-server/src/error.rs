use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cookbook_shared::PasswordError;
use cookbook_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation (email taken, recipe already liked).
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn kind(&self) -> &'static str {
        match self {
            ServerError::Validation(_) => "validation_error",
            ServerError::Conflict(_) => "conflict",
            ServerError::InvalidCredentials => "invalid_credentials",
            ServerError::Internal(_) => "server_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            // Auth failures are a normal outcome for the client, not an HTTP error.
            ServerError::InvalidCredentials => (StatusCode::OK, self.to_string()),
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "success": false,
            "message": message,
            "error": self.kind(),
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => ServerError::Conflict(format!("{what} already exists")),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for ServerError {
    fn from(err: PasswordError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(rejection: MultipartRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::Validation(format!("Multipart error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServerError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServerError::InvalidCredentials, StatusCode::OK),
            (ServerError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: ServerError = StoreError::Conflict("email".into()).into();
        assert!(matches!(err, ServerError::Conflict(msg) if msg == "email already exists"));

        let err: ServerError = StoreError::Migration("v001".into()).into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
