//! Gateway error taxonomy
//!
//! Central mapping from failure classes to HTTP statuses. Parsing and
//! validation failures are raised before any storage call; storage failures
//! are logged and surfaced as opaque 500s.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StorageError;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Request-level failures and their HTTP mapping
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or unknown query option (400)
    #[error("invalid query option: {0}")]
    Query(String),

    /// Invalid mutation payload (400)
    #[error("invalid payload: {0}")]
    Payload(String),

    /// Unknown entity set (404)
    #[error("unknown entity set '{0}'")]
    UnknownEntitySet(String),

    /// No record under the requested key (404)
    #[error("resource not found")]
    NotFound,

    /// Payload key differs from the path key (409)
    #[error("key conflict: {0}")]
    Conflict(String),

    /// Missing or rejected credentials (401)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Method not supported for the addressed resource (405)
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Underlying storage call failed (500)
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GatewayError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Query(_) | GatewayError::Payload(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownEntitySet(_) | GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the log, not in the response body.
        let message = match &self {
            GatewayError::Storage(err) => {
                tracing::error!(error = %err, "storage call failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "error": { "message": message } }));

        if matches!(self, GatewayError::Auth(_)) {
            return (
                status,
                [(header::WWW_AUTHENTICATE, crate::auth::CHALLENGE)],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

impl From<crate::schema::SchemaError> for GatewayError {
    fn from(err: crate::schema::SchemaError) -> Self {
        match err {
            crate::schema::SchemaError::UnknownEntitySet(name) => {
                GatewayError::UnknownEntitySet(name)
            }
            // Other schema errors are startup-fatal and never reach a request.
            other => GatewayError::Query(other.to_string()),
        }
    }
}
