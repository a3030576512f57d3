use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use todo_server::{config::Config, logging, TodoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init_logging(config.verbose, config.quiet, config.log_format)?;

    let store = if config.in_memory {
        TodoStore::open_in_memory().context("opening in-memory store")?
    } else {
        TodoStore::open(&config.database)
            .with_context(|| format!("opening database {}", config.database.display()))?
    };
    let store = Arc::new(store);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    todo_server::run_until(listener, store.clone(), shutdown_signal()).await?;

    match Arc::try_unwrap(store) {
        Ok(store) => store.close().context("closing store")?,
        Err(_) => warn!("store still referenced at shutdown; released on drop"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
