use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use todo_server::{config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    let config = Config::parse();
    todo_server::telemetry::init_tracing(&config.log_level);

    let repo = config
        .build_repository()
        .await
        .context("storage initialization failed")?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, storage = ?config.storage, "listening");

    let state = AppState::new(repo).with_public_url(config.public_url.clone());
    todo_server::run(listener, state).await?;
    Ok(())
}
