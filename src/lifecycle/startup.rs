//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listening socket
//! - Classify bind failures so the caller can exit with the right message
//!
//! # Design Decisions
//! - Fail fast: any bind error is fatal
//! - Listener binds last, after config and collaborators are ready

use std::io::ErrorKind;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("permission denied binding {addr}")]
    PermissionDenied { addr: SocketAddr },

    #[error("address {addr} is already in use")]
    AddrInUse { addr: SocketAddr },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// Operator-facing hint for the failure, if there is one.
    pub fn remediation(&self) -> Option<String> {
        match self {
            StartupError::PermissionDenied { addr } if addr.port() < 1024 => Some(format!(
                "port {} is privileged; run with CAP_NET_BIND_SERVICE or choose a port >= 1024",
                addr.port()
            )),
            StartupError::PermissionDenied { .. } => None,
            StartupError::AddrInUse { addr } => Some(format!(
                "stop the process holding port {} or set PORT / --port to a free port",
                addr.port()
            )),
            StartupError::Bind { .. } => None,
        }
    }
}

/// Bind the gateway listener.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| match source.kind() {
        ErrorKind::PermissionDenied => StartupError::PermissionDenied { addr },
        ErrorKind::AddrInUse => StartupError::AddrInUse { addr },
        _ => StartupError::Bind { addr, source },
    })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}
