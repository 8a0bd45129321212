#![cfg(feature = "server-http")]
// ABOUTME: Streamable HTTP transport for the schema.gov.it MCP server
// ABOUTME: Mounts the rmcp session service under /mcp next to a plain /health probe

use crate::http_config::HttpServerConfig;
use crate::official_server::SchemaGovMcpServer;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Router with the MCP service and the health endpoint
pub fn build_http_app(server: SchemaGovMcpServer, config: &HttpServerConfig) -> Router {
    build_http_app_with_cancellation(server, config, CancellationToken::new())
}

pub fn build_http_app_with_cancellation(
    server: SchemaGovMcpServer,
    config: &HttpServerConfig,
    cancellation_token: CancellationToken,
) -> Router {
    let session_manager = Arc::new(LocalSessionManager::default());

    let http_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        session_manager,
        StreamableHttpServerConfig {
            sse_keep_alive: Some(Duration::from_secs(config.keep_alive_seconds)),
            stateful_mode: true,
            cancellation_token,
        },
    );

    Router::new()
        .nest_service("/mcp", http_service)
        .route("/health", axum::routing::get(health_check))
}

/// Serve until ctrl-c
pub async fn start_http_server(
    server: SchemaGovMcpServer,
    config: HttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let shutdown = CancellationToken::new();
    let app = build_http_app_with_cancellation(server, &config, shutdown.child_token());

    info!("schema.gov.it MCP HTTP server listening on http://{}", addr);
    info!(
        "  POST http://{}/mcp - Initialize session and send MCP requests",
        addr
    );
    info!(
        "  GET  http://{}/mcp - Open SSE stream (requires Mcp-Session-Id header)",
        addr
    );
    info!("  GET  http://{}/health - Health check", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down HTTP server");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
