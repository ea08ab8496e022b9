//! HTTP server for the table assistant

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use table_assistant::config::{init_logging, Settings};
use table_assistant::llm::GeneratorConfig;
use table_assistant::server::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Serve the table assistant over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();

    // Tables load before the listener binds; a failed load never serves traffic
    let assistant = args
        .settings
        .build_assistant(&GeneratorConfig::from_env())
        .context("Initialization failed")?;

    let app = create_router(AppState {
        assistant: Arc::new(assistant),
    });

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Server listening on http://{}", args.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
