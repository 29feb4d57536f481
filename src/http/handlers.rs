//! Liveness, readiness and the terminal 404 handler.

use axum::{
    extract::State,
    http::{header, HeaderMap, Uri},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{GatewayError, AVAILABLE_ENDPOINTS};
use crate::http::server::AppState;
use crate::routing::{MountState, Service};

#[derive(Serialize)]
pub struct RootInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
    pub services: BTreeMap<Service, &'static str>,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
    pub origin: Option<String>,
}

pub async fn root(State(state): State<AppState>) -> Json<RootInfo> {
    let services = state
        .services
        .iter()
        .map(|s| {
            let label = match s.state {
                MountState::Available => "available",
                MountState::Unavailable { .. } => "unavailable",
            };
            (s.service, label)
        })
        .collect();

    Json(RootInfo {
        message: "frontdoor API gateway is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: &AVAILABLE_ENDPOINTS,
        services,
    })
}

pub async fn health(headers: HeaderMap) -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        origin: headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    })
}

pub async fn not_found(uri: Uri) -> GatewayError {
    tracing::debug!(path = %uri.path(), "No route matched");
    GatewayError::NotFound {
        path: uri.path().to_string(),
    }
}
