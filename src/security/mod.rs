//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list, preflight answers)
//!     → body limit (tower-http, see http::server)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unlisted origin never reaches a handler
//! - Requests without an Origin header are not cross-origin and pass

pub mod cors;

pub use cors::{Decision, OriginGate};
