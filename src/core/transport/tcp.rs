//! TCP transport implementation.
//!
//! Raw TCP socket transport exposing the file tools over MCP (line-delimited
//! JSON-RPC). Every connection shares the same file service and access policy.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use rmcp::ServiceExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info, info_span, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::ConfEditorServer;

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the TCP transport until the listener fails to bind.
    pub async fn run(self, server: ConfEditorServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (MCP over TCP)", addr);

        let next_id = AtomicU64::new(1);

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    // Avoid spinning on persistent accept errors
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
            }

            let id = next_id.fetch_add(1, Ordering::Relaxed);
            let span = info_span!("connection", id, peer = %peer_addr);
            tokio::spawn(serve_connection(server.clone(), stream, peer_addr).instrument(span));
        }
    }
}

/// Serve MCP requests from one client until it disconnects.
async fn serve_connection(server: ConfEditorServer, stream: TcpStream, peer_addr: SocketAddr) {
    info!("Accepted connection from {}", peer_addr);

    let service = match server.serve(stream).await {
        Ok(service) => service,
        Err(e) => {
            warn!("MCP handshake with {} failed: {}", peer_addr, e);
            return;
        }
    };

    match service.waiting().await {
        Ok(reason) => info!("Client {} disconnected ({:?})", peer_addr, reason),
        Err(e) => warn!("Error while serving client {}: {:?}", peer_addr, e),
    }
}
