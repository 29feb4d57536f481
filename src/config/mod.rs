//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, parse & deserialize)
//!     → CLI / environment overrides (port, host)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the allow-list never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, FallbackPolicy, GatewayConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, OriginMatch, RoutingConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
