//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use frontdoor::config::{GatewayConfig, UpstreamConfig};
use frontdoor::routing::{Collaborators, LoadError, Service};
use frontdoor::{HttpServer, Shutdown};

pub const APP_ORIGIN: &str = "https://app.example.com";

/// Config bound to an ephemeral loopback port with a single allowed origin.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".parse().unwrap();
    config.listener.port = 0;
    config.cors.allowed_origins = vec![APP_ORIGIN.to_string(), "null".to_string()];
    config
}

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the gateway on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig, collaborators: Collaborators) -> Gateway {
    let listener = TcpListener::bind(config.listener.socket_addr()).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, collaborators);
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    Gateway {
        addr,
        shutdown,
        handle,
    }
}

/// Every service answers with its own name.
pub fn named_collaborators() -> Collaborators {
    Service::ALL.iter().fold(Collaborators::new(), |c, &service| {
        c.register(service, move || -> Result<Router, LoadError> {
            Ok(Router::new().fallback(move || async move { service.name() }))
        })
    })
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a mock upstream that answers with the request line it received.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        let head_end = loop {
                            if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                                break i + 4;
                            }
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        };
                        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
                        let request_line = head.lines().next().unwrap_or_default().to_string();

                        // drain the body so closing the socket does not reset it
                        let content_length = head
                            .lines()
                            .filter_map(|l| l.split_once(':'))
                            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        while buf.len() < head_end + content_length {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }

                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Upstream: echo\r\nConnection: close\r\n\r\n{}",
                            request_line.len(),
                            request_line
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream that reads whatever it is sent and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut chunk = [0u8; 1024];
                while let Ok(n) = socket.read(&mut chunk).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });

    addr
}

/// Config with every service forwarded to `backend`.
pub fn forwarding_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = test_config();
    for service in Service::ALL {
        config.services.insert(
            service,
            UpstreamConfig {
                upstream: format!("http://{backend}"),
            },
        );
    }
    config
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
