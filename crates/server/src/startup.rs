use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router wired to a fresh in-memory store as configured.
pub fn build_app(cfg: &AppConfig) -> Router {
    let state = AppState::in_memory(cfg.storage.seed_sample_user);
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app and serve it until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg);

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    let local = listener
        .local_addr()
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(addr = %local, seeded = cfg.storage.seed_sample_user, "starting users api");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn occupied_port_is_reported_as_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let mut cfg = configs::parse(&format!("[server]\nport = {port}\n")).unwrap();
        cfg.normalize_and_validate().unwrap();

        let err = run(cfg).await.unwrap_err();
        match err.downcast_ref::<StartupError>() {
            Some(StartupError::Bind { addr, .. }) => assert_eq!(addr, &format!("127.0.0.1:{port}")),
            other => panic!("expected bind error, got {other:?}"),
        }
    }
}
