//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span)
//!     → [origin gate] (security::cors)
//!     → handlers.rs (/, /api/health) or [mounted service group]
//!     → handlers.rs not_found when nothing matched
//!     → error::GatewayError renders any failure
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
