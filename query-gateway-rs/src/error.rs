// query-gateway-rs/src/error.rs
//
// Failure taxonomy and the uniform response envelope.
//
// Every failure the gateway can observe is classified into exactly one
// category before a response is produced, and the translation into an
// HTTP status + JSON body happens in a single step here. Handlers never
// let a failure escape past this boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::executor::ExecuteError;

/// Gateway failure categories.
///
/// `NoAccessToken` is a subtype of the client category and maps to 400
/// like any other client failure.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Downstream/infrastructure fault in the query engine.
    #[error("Query engine error: {0}")]
    Server(String),

    /// Malformed or invalid input from the caller.
    #[error("Invalid request: {0}")]
    Client(String),

    /// The host settings hold no usable access token.
    #[error("No access token is currently available")]
    NoAccessToken,

    /// Anything that doesn't fit the categories above.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// HTTP status for this failure category.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Client(_) | GatewayError::NoAccessToken => StatusCode::BAD_REQUEST,
            GatewayError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this failure, built by the matching formatter.
    pub fn body(&self) -> Value {
        match self {
            GatewayError::Server(_) => format_server_error(self),
            GatewayError::Client(_) | GatewayError::NoAccessToken => format_client_error(self),
            GatewayError::Unknown(_) => format_unknown_error(self),
        }
    }
}

impl From<ExecuteError> for GatewayError {
    fn from(err: ExecuteError) -> Self {
        match err {
            ExecuteError::Server(msg) => GatewayError::Server(msg),
            ExecuteError::Client(msg) => GatewayError::Client(msg),
            ExecuteError::Other(msg) => GatewayError::Unknown(msg),
        }
    }
}

/// Format a server-side failure as a GraphQL-style error body.
pub fn format_server_error(err: &GatewayError) -> Value {
    format_error(err, "internal")
}

/// Format a client-side failure as a GraphQL-style error body.
pub fn format_client_error(err: &GatewayError) -> Value {
    format_error(err, "user")
}

/// Format an uncategorized failure as a GraphQL-style error body.
pub fn format_unknown_error(err: &GatewayError) -> Value {
    format_error(err, "unknown")
}

fn format_error(err: &GatewayError, category: &str) -> Value {
    json!({
        "errors": [{
            "message": err.to_string(),
            "extensions": { "category": category },
        }]
    })
}

/// Uniform `{body, status}` wrapper returned for every request outcome.
#[derive(Debug)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Value,
}

impl ResponseEnvelope {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn from_error(err: &GatewayError) -> Self {
        Self {
            status: err.status(),
            body: err.body(),
        }
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Server("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Client("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NoAccessToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::Unknown("what".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_execute_error_classification() {
        let server: GatewayError = ExecuteError::Server("down".to_string()).into();
        assert!(matches!(server, GatewayError::Server(_)));

        let client: GatewayError = ExecuteError::Client("bad syntax".to_string()).into();
        assert!(matches!(client, GatewayError::Client(_)));

        let other: GatewayError = ExecuteError::Other("panic".to_string()).into();
        assert!(matches!(other, GatewayError::Unknown(_)));
    }

    #[test]
    fn test_formatter_categories() {
        let server = GatewayError::Server("down".to_string());
        assert_eq!(
            server.body()["errors"][0]["extensions"]["category"],
            "internal"
        );

        let client = GatewayError::Client("bad".to_string());
        assert_eq!(client.body()["errors"][0]["extensions"]["category"], "user");

        let unknown = GatewayError::Unknown("what".to_string());
        assert_eq!(
            unknown.body()["errors"][0]["extensions"]["category"],
            "unknown"
        );
    }

    #[test]
    fn test_error_body_carries_message() {
        let err = GatewayError::Client("bad syntax".to_string());
        let message = err.body()["errors"][0]["message"]
            .as_str()
            .map(str::to_string);
        assert_eq!(message, Some("Invalid request: bad syntax".to_string()));
    }

    #[test]
    fn test_envelope_from_error() {
        let err = GatewayError::NoAccessToken;
        let envelope = ResponseEnvelope::from_error(&err);
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert!(envelope.body["errors"][0]["message"]
            .as_str()
            .map(|m| m.contains("No access token"))
            .unwrap_or(false));
    }
}
