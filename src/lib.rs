//! frontdoor: HTTP entry point for the web frontends.
//!
//! Validates cross-origin requests against an allow-list, then dispatches to
//! five sub-service route groups (auth, sales, analytics, upload, chatbot),
//! falling back to degraded stubs when a group cannot be loaded.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Collaborators, Service};
