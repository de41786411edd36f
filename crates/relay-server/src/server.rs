//! Relay server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::error::{RelayError, RelayResult};
use crate::routes::create_router;
use crate::state::AppState;

/// The HTTP server wrapping the webhook receiver.
#[derive(Clone)]
pub struct RelayServer {
    state: Arc<AppState>,
}

impl RelayServer {
    /// Creates a server over the given shared state.
    #[must_use]
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Starts the server and runs until a fatal error.
    pub async fn serve(&self, addr: SocketAddr) -> RelayResult<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %addr, "alert relay listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| RelayError::Internal {
                reason: e.to_string(),
            })
    }

    /// Starts the server; shuts down cleanly when `shutdown` completes.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> RelayResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %addr, "alert relay listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RelayError::Internal {
                reason: e.to_string(),
            })?;

        info!("alert relay shut down");
        Ok(())
    }

    /// The router, for tests or embedding.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        create_router(Arc::clone(&self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_dispatch::RobotSender;
    use relay_render::Transformer;
    use relay_store::SqliteStateStore;

    use crate::config::AppConfig;

    fn make_server() -> RelayServer {
        let store = Arc::new(SqliteStateStore::open_in_memory().unwrap());
        let transformer = Transformer::new(None, "Asia/Shanghai".parse().unwrap()).unwrap();
        let sender = RobotSender::new().unwrap();
        let state = Arc::new(AppState::new(
            store,
            transformer,
            sender,
            &AppConfig::default(),
        ));
        RelayServer::new(state)
    }

    #[tokio::test]
    async fn serve_with_shutdown_stops_on_signal() {
        let server = make_server();
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(addr, async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), handle).await;
        assert!(result.is_ok());
    }

    #[test]
    fn router_builds() {
        let server = make_server();
        let _router = server.router();
    }
}
