//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Collaborators (one factory per Service)
//!     → collaborator.rs (run factory, contain panics)
//!     → router.rs (apply fallback policy, mount groups or stubs)
//!     → Freeze as immutable axum Router
//!
//! Request:
//!     /api/<service>/...
//!     → mounted group (collaborator, e.g. upstream.rs forwarder)
//!     → or degraded stub (503)
//! ```
//!
//! # Design Decisions
//! - Prefixes are fixed; collaborators only decide what happens beneath them
//! - Routes compiled at startup, immutable at runtime
//! - Health endpoints are mounted separately and never stubbed

pub mod collaborator;
pub mod router;
pub mod service;
pub mod upstream;

pub use collaborator::{Collaborators, LoadError, ServiceFactory};
pub use router::{mount_services, MountState, ServiceStatus};
pub use service::Service;
