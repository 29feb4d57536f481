//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events through `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - One subscriber installed at startup; components only use the macros
//! - Request ID recorded on every request span
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
