pub mod routes;

use crate::config::Config;
use crate::ledger::Session;
use anyhow::{Context, Result};
use axum::Router;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::info;

pub async fn run_server(config: Arc<Config>, session: Session) -> Result<()> {
    let port = config.api_port;
    let state = routes::ApiState {
        config,
        session: Arc::new(Mutex::new(session)),
    };
    let app: Router = routes::router(state);

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server: {addr}"))?;

    info!(address = %addr, "Virtual360 API server started");

    axum::serve(listener, app)
        .await
        .context("API server failed")?;

    Ok(())
}
