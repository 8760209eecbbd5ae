// query-gateway-rs/src/executor.rs
//
// Downstream query-execution capability.
//
// This module provides:
// - The `QueryExecutor` seam the gateway delegates every query to
// - Typed failure classification (server / client / other) at that seam
// - `HttpQueryExecutor`: real HTTP forwarding to the query engine via reqwest
//
// Configuration (.env file):
// - QUERY_ENGINE_SERVICE_ADDR / QUERY_ENGINE_SERVICE_PORT: engine address
//   (resolved by the caller through config-rs)
// - QUERY_ENGINE_TIMEOUT_SECS: request timeout in seconds (default: 60)

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::payload::QueryPayload;

/// Typed failure raised by a query executor.
///
/// The gateway classifies these into response categories; an executor must
/// pick the variant that matches what it observed, and `Other` for anything
/// it cannot attribute to either side.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecuteError {
    /// The engine (or the path to it) failed.
    #[error("query engine failure: {0}")]
    Server(String),

    /// The engine rejected the query as malformed or invalid.
    #[error("query rejected: {0}")]
    Client(String),

    /// Unexpected fault that fits neither side.
    #[error("unexpected query failure: {0}")]
    Other(String),
}

/// The downstream capability that actually performs the query.
///
/// A successful execution returns the engine's JSON-encoded result string;
/// the gateway decodes it before wrapping it in an envelope.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute_query(&self, payload: &QueryPayload) -> Result<String, ExecuteError>;

    /// Whether the capability's backing service is currently reachable.
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// HTTP client forwarding query payloads to the upstream query engine.
#[derive(Debug, Clone)]
pub struct HttpQueryExecutor {
    client: Client,
    engine_url: String,
}

impl HttpQueryExecutor {
    /// Creates an executor targeting `engine_url`.
    ///
    /// Reads QUERY_ENGINE_TIMEOUT_SECS for the request timeout (default 60s).
    pub fn new(engine_url: String) -> Self {
        let timeout_secs = env::var("QUERY_ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, engine_url }
    }

    pub fn engine_url(&self) -> &str {
        &self.engine_url
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    async fn execute_query(&self, payload: &QueryPayload) -> Result<String, ExecuteError> {
        let mut request_body = json!({ "query": payload.query() });
        if let Some(variables) = payload.variables() {
            request_body["variables"] = serde_json::Value::Object(variables.clone());
        }

        let response = self
            .client
            .post(&self.engine_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| ExecuteError::Server(format!("query engine unreachable: {}", err)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ExecuteError::Server(format!("failed to read engine response: {}", err)))?;

        if status.is_success() {
            Ok(body)
        } else if status.is_client_error() {
            Err(ExecuteError::Client(format!(
                "engine rejected the query ({}): {}",
                status, body
            )))
        } else if status.is_server_error() {
            Err(ExecuteError::Server(format!(
                "engine error ({}): {}",
                status, body
            )))
        } else {
            Err(ExecuteError::Other(format!(
                "unexpected engine status {}: {}",
                status, body
            )))
        }
    }

    async fn is_healthy(&self) -> bool {
        // Any HTTP response counts as reachable; only transport failures
        // mark the engine unhealthy.
        match self.client.get(&self.engine_url).send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Query engine health probe failed: {}", err);
                false
            }
        }
    }
}
