// query-gateway-rs/src/lib.rs
//
// Query Gateway - request-routing and error-mapping boundary
//
// Receives a raw request (headers + body), extracts a query payload,
// delegates it to an injected query-execution capability, and translates
// every outcome into a uniform JSON response envelope with a definite
// HTTP status. Collaborators (query engine, token settings, requester
// capabilities) are injected at construction; the gateway itself keeps
// no state across requests.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod auth_middleware;
pub mod error;
pub mod executor;
pub mod payload;
pub mod settings_client;

use auth_middleware::permission_middleware;
use error::{GatewayError, ResponseEnvelope};
use executor::QueryExecutor;
use payload::QueryPayload;
use settings_client::{AccessTokenInfo, TokenSettings};

/// Default maximum request payload size (10MB)
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Route namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "graphql";

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: i64,
    pub status: String,
}

/// Core gateway state: the route namespace and the injected collaborators.
pub struct QueryGateway {
    namespace: String,
    executor: Arc<dyn QueryExecutor>,
    settings: Arc<dyn TokenSettings>,
}

impl QueryGateway {
    pub fn new(
        namespace: &str,
        executor: Arc<dyn QueryExecutor>,
        settings: Arc<dyn TokenSettings>,
    ) -> Self {
        Self {
            namespace: namespace.trim_matches('/').to_string(),
            executor,
            settings,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Create the Axum router with all routes and middleware
    pub fn create_router(self: Arc<Self>) -> Router {
        let api_path = format!("/{}/api", self.namespace);
        let token_path = format!("{}/token", api_path);

        Router::new()
            .route("/", get(Self::root_handler))
            .route("/health", get(Self::health_handler))
            .route(&api_path, post(Self::query_handler))
            .route(&token_path, get(Self::token_handler))
            .layer(middleware::from_fn(permission_middleware))
            .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self)
    }

    async fn root_handler(State(state): State<Arc<Self>>) -> impl IntoResponse {
        Json(serde_json::json!({
            "service": "query-gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": [
                format!("POST /{}/api", state.namespace),
                format!("GET /{}/api/token", state.namespace),
                "GET /health",
            ]
        }))
    }

    async fn health_handler(State(state): State<Arc<Self>>) -> impl IntoResponse {
        let uptime = START_TIME.elapsed().as_secs() as i64;
        let engine_healthy = state.executor.is_healthy().await;

        let status = if engine_healthy { "SERVING" } else { "DEGRADED" };

        Json(HealthResponse {
            healthy: engine_healthy,
            service_name: "query-gateway".to_string(),
            uptime_seconds: uptime,
            status: status.to_string(),
        })
    }

    async fn query_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> ResponseEnvelope {
        state.handle_query(&headers, &body).await
    }

    async fn token_handler(State(state): State<Arc<Self>>) -> ResponseEnvelope {
        state.handle_token_request()
    }

    /// Extract the query payload from the inbound request and delegate it
    /// to the query engine. Every outcome - success, client failure,
    /// server failure, or anything unexpected - becomes an envelope; no
    /// failure escapes to the caller unhandled.
    pub async fn handle_query(&self, headers: &HeaderMap, body: &[u8]) -> ResponseEnvelope {
        let request_id = uuid::Uuid::new_v4();

        let payload = match QueryPayload::from_request(headers, body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%request_id, "Rejected query payload: {}", err);
                return ResponseEnvelope::from_error(&err);
            }
        };

        tracing::info!(
            %request_id,
            "Executing query ({} bytes, variables: {})",
            payload.query().len(),
            payload.variables().is_some()
        );

        match self.executor.execute_query(&payload).await {
            Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(decoded) => ResponseEnvelope::ok(decoded),
                Err(err) => {
                    let err = GatewayError::Unknown(format!(
                        "query engine returned a non-JSON result: {}",
                        err
                    ));
                    tracing::error!(%request_id, "{}", err);
                    ResponseEnvelope::from_error(&err)
                }
            },
            Err(err) => {
                let err = GatewayError::from(err);
                tracing::error!(%request_id, "Query failed: {}", err);
                ResponseEnvelope::from_error(&err)
            }
        }
    }

    /// Report the host's current access token, or a "no token" client
    /// failure (400) when the settings hold no usable token.
    pub fn handle_token_request(&self) -> ResponseEnvelope {
        match self.access_token_info() {
            Ok(info) => match serde_json::to_value(&info) {
                Ok(body) => ResponseEnvelope::ok(body),
                Err(err) => ResponseEnvelope::from_error(&GatewayError::Unknown(format!(
                    "failed to serialize token info: {}",
                    err
                ))),
            },
            Err(err) => {
                tracing::warn!("Token request failed: {}", err);
                ResponseEnvelope::from_error(&err)
            }
        }
    }

    fn access_token_info(&self) -> Result<AccessTokenInfo, GatewayError> {
        let access_token = self
            .settings
            .current_access_token()
            .filter(|token| !token.is_empty())
            .ok_or(GatewayError::NoAccessToken)?;

        let expires_at = self
            .settings
            .access_token_expiration_time()
            .ok_or(GatewayError::NoAccessToken)?;

        Ok(AccessTokenInfo {
            access_token,
            expires_at,
        })
    }
}
