// query-gateway-rs/src/main.rs
// Query Gateway - HTTP entry point for query forwarding
//
// Wires the concrete collaborators (HTTP query engine client, env-backed
// token settings) into the gateway and serves the router.

use std::env;
use std::sync::Arc;

use config_rs::ServiceConfig;
use query_gateway::executor::HttpQueryExecutor;
use query_gateway::settings_client::EnvTokenSettings;
use query_gateway::{QueryGateway, DEFAULT_NAMESPACE};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Use standardized configuration for ports and addresses
    let service_config = ServiceConfig::new("gateway");
    let port = service_config.get_service_port(8000);
    let engine_addr = service_config.get_client_address("QUERY_ENGINE", 8090);

    let namespace =
        env::var("GATEWAY_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

    tracing::info!("Using gateway port: {}", port);
    tracing::info!("Using query engine address: {}", engine_addr);
    tracing::info!("Using route namespace: /{}/api", namespace.trim_matches('/'));

    let executor = Arc::new(HttpQueryExecutor::new(engine_addr.clone()));
    let settings = Arc::new(EnvTokenSettings::new());

    let gateway = Arc::new(QueryGateway::new(&namespace, executor, settings));
    let app = gateway.create_router();

    let addr = service_config.get_bind_address(port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Query gateway starting on {}", addr);
    tracing::info!("Query engine target: {}", engine_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
