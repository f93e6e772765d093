// MCP stdio server: browser automation and network-capture tools.

use anyhow::Result;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = pagescan::load_yaml_config().unwrap_or_default();
    let server = pagescan::PagescanServer::new(config);
    let manager = server.manager();

    tracing::info!("pagescan MCP server starting on stdio");
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))?;
    running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server terminated abnormally: {e}"))?;

    // Client disconnected; take Chrome down with us.
    manager.shutdown().await?;
    Ok(())
}
