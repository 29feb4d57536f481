//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check allow-list entries are bare origins
//! - Check upstream URLs are usable http bases
//! - Validate value ranges (body limit > 0, metrics address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::Service;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cors.allowed_origins is empty")]
    EmptyAllowList,

    #[error("cors.allowed_origins entry {entry:?} is not an origin: {reason}")]
    InvalidOrigin { entry: String, reason: String },

    #[error("services.{service}.upstream {url:?} is invalid: {reason}")]
    InvalidUpstream {
        service: Service,
        url: String,
        reason: String,
    },

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }
    for entry in &config.cors.allowed_origins {
        if let Err(reason) = check_origin(entry) {
            errors.push(ValidationError::InvalidOrigin {
                entry: entry.clone(),
                reason,
            });
        }
    }

    for (service, upstream) in &config.services {
        if let Err(reason) = check_upstream(&upstream.upstream) {
            errors.push(ValidationError::InvalidUpstream {
                service: *service,
                url: upstream.upstream.clone(),
                reason,
            });
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(entry: &str) -> Result<(), String> {
    if entry == "null" {
        return Ok(());
    }
    let url = Url::parse(entry).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err("origins carry no path, query or fragment".to_string());
    }
    Ok(())
}

/// Upstreams are reached over plain HTTP on a private network.
pub(crate) fn check_upstream(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}
