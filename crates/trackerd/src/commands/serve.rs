//! `trackerd serve` -- run the HTTP server until Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use tracker_api::{AppState, router};
use tracker_storage::Storage;

use crate::cli::ServeArgs;
use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext, args: &ServeArgs) -> Result<()> {
    let addr: SocketAddr = match args.bind {
        Some(ref bind) => bind
            .parse()
            .with_context(|| format!("invalid listen address: {bind}"))?,
        None => ctx.config.bind_addr()?,
    };

    let store = ctx.open_store()?;
    match store.purge_expired_sessions() {
        Ok(0) => {}
        Ok(purged) => info!(purged, "expired sessions removed"),
        Err(e) => warn!(error = %e, "failed to purge expired sessions"),
    }
    let state = AppState::new(Arc::new(store), ctx.page_limits());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(state, addr))
}

async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
