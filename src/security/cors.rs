//! Origin gate.
//! Enforces the cross-origin allow-list and answers preflight requests.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

use crate::config::{CorsConfig, OriginMatch};
use crate::error::GatewayError;
use crate::observability::metrics;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Authorization";

/// Outcome of evaluating a declared origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }
}

#[derive(Debug, Clone)]
struct AllowedOrigin {
    /// Normalized form (no trailing slash).
    value: String,
    /// `scheme://host` of a loopback entry, port dropped.
    loopback_base: Option<String>,
}

/// Immutable allow-list plus matching policy, shared by every request.
#[derive(Debug)]
pub struct OriginGate {
    entries: Vec<AllowedOrigin>,
    /// Entries as configured, reported back on denial.
    listed: Vec<String>,
    matching: OriginMatch,
    max_age_secs: Option<u64>,
}

impl OriginGate {
    pub fn new(config: &CorsConfig) -> Self {
        let entries = config
            .allowed_origins
            .iter()
            .map(|raw| AllowedOrigin {
                value: normalize(raw).to_string(),
                loopback_base: loopback_base(raw),
            })
            .collect();

        Self {
            entries,
            listed: config.allowed_origins.clone(),
            matching: config.origin_match,
            max_age_secs: config.max_age_secs,
        }
    }

    /// The allow-list as configured.
    pub fn allowed_origins(&self) -> &[String] {
        &self.listed
    }

    /// Decide whether a request declaring `origin` may proceed.
    pub fn evaluate(&self, origin: Option<&str>) -> Decision {
        let Some(origin) = origin else {
            return Decision::Allow;
        };
        let origin = normalize(origin);

        let allowed = self.entries.iter().any(|entry| {
            if entry.value == origin {
                return true;
            }
            if self.matching != OriginMatch::LoopbackPrefix {
                return false;
            }
            let Some(base) = entry.loopback_base.as_deref() else {
                return false;
            };
            match origin.strip_prefix(base) {
                Some("") => true,
                Some(rest) => rest
                    .strip_prefix(':')
                    .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
                None => false,
            }
        });

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Attach the CORS grant to an allowed response.
    fn apply_headers(&self, headers: &mut HeaderMap, origin: Option<&HeaderValue>, preflight: bool) {
        if let Some(origin) = origin {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        if preflight {
            if let Some(max_age) = self.max_age_secs {
                headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
            }
        }
    }
}

fn normalize(origin: &str) -> &str {
    origin.strip_suffix('/').unwrap_or(origin)
}

fn loopback_base(entry: &str) -> Option<String> {
    let url = Url::parse(entry).ok()?;
    let host = url.host_str()?;
    matches!(host, "localhost" | "127.0.0.1" | "[::1]").then(|| format!("{}://{}", url.scheme(), host))
}

/// Middleware running ahead of the router.
pub async fn origin_gate_middleware(
    State(gate): State<Arc<OriginGate>>,
    req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let origin_header = req.headers().get(header::ORIGIN).cloned();
    let origin = origin_header
        .as_ref()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let decision = gate.evaluate(origin.as_deref());
    metrics::record_origin_decision(decision.as_str());

    if decision == Decision::Deny {
        let origin = origin.unwrap_or_default();
        tracing::warn!(origin = %origin, decision = decision.as_str(), "Origin rejected");
        return Err(GatewayError::OriginDenied {
            origin,
            allowed_origins: gate.allowed_origins().to_vec(),
        });
    }
    tracing::debug!(
        origin = origin.as_deref().unwrap_or("<none>"),
        decision = decision.as_str(),
        "Origin accepted"
    );

    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        gate.apply_headers(response.headers_mut(), origin_header.as_ref(), true);
        return Ok(response);
    }

    let mut response = next.run(req).await;
    gate.apply_headers(response.headers_mut(), origin_header.as_ref(), false);
    Ok(response)
}
