//! TCP accept loop serving the HTTP router.

use crate::error::ServerResult;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Pause after an accept error that is not tied to one connection, such as
/// running out of file descriptors.
pub const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// A bound chat server.
pub struct ChatServer {
    listener: TcpListener,
    app: Router,
}

impl ChatServer {
    pub async fn bind(addr: &str, app: Router) -> ServerResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, app })
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is dropped. Each connection is
    /// served on its own task, WebSocket upgrades included.
    pub async fn run(self) -> ServerResult<()> {
        info!(addr = %self.local_addr()?, "Listening");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) if is_connection_error(&e) => {
                    debug!(error = %e, "Connection dropped before accept");
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let service = TowerToHyperService::new(self.app.clone());
            let span = info_span!("connection", conn_id = %Uuid::new_v4(), peer = %peer);
            tokio::spawn(
                async move {
                    debug!("Connection opened");
                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection_with_upgrades(TokioIo::new(stream), service)
                        .await
                    {
                        debug!(error = %e, "Connection ended with error");
                    }
                    debug!("Connection closed");
                }
                .instrument(span),
            );
        }
    }
}

/// Errors that concern only the connection being accepted.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
