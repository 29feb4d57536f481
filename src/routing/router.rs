//! Sub-service mounting.
//!
//! # Responsibilities
//! - Load the five collaborator route groups
//! - Apply the fallback policy when some of them fail
//! - Mount loaded groups or degraded stubs under their prefixes
//!
//! # Design Decisions
//! - Runs once at startup; the mounted tree is immutable afterwards
//! - Load failures are logged here and never reach a caller
//! - Stubs answer every method and sub-path with 503

use axum::Router;
use serde::Serialize;

use crate::config::FallbackPolicy;
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::routing::collaborator::{Collaborators, LoadError};
use crate::routing::Service;

/// Whether a service ended up backed by its collaborator or by a stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MountState {
    Available,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub service: Service,
    #[serde(flatten)]
    pub state: MountState,
}

/// Degraded route group for `service`.
pub fn stub_router(service: Service) -> Router {
    Router::new().fallback(move || async move {
        metrics::record_stub_response(service.name());
        GatewayError::ServiceUnavailable { service }
    })
}

/// Load every collaborator and mount the result onto `router`.
pub fn mount_services(
    router: Router,
    collaborators: &Collaborators,
    policy: FallbackPolicy,
) -> (Router, Vec<ServiceStatus>) {
    let loaded: Vec<(Service, Result<Router, LoadError>)> = Service::ALL
        .iter()
        .map(|&service| (service, collaborators.load(service)))
        .collect();

    for (service, result) in &loaded {
        if let Err(e) = result {
            tracing::error!(service = %service, error = %e, "Failed to load service routes");
        }
    }

    let any_failed = loaded.iter().any(|(_, result)| result.is_err());
    if any_failed && policy == FallbackPolicy::AllOrNothing {
        tracing::warn!("Falling back to stub handlers for all services");
    }

    let mut statuses = Vec::with_capacity(loaded.len());
    let router = loaded.into_iter().fold(router, |router, (service, result)| {
        let (group, state) = match (result, policy) {
            (Ok(group), FallbackPolicy::PerService) => (group, MountState::Available),
            (Ok(group), FallbackPolicy::AllOrNothing) if !any_failed => {
                (group, MountState::Available)
            }
            (Ok(_), FallbackPolicy::AllOrNothing) => (
                stub_router(service),
                MountState::Unavailable {
                    reason: "another service failed to load".to_string(),
                },
            ),
            (Err(e), _) => (
                stub_router(service),
                MountState::Unavailable {
                    reason: e.to_string(),
                },
            ),
        };

        match &state {
            MountState::Available => {
                tracing::info!(service = %service, path = service.mount_path(), "Service routes mounted")
            }
            MountState::Unavailable { .. } => {
                tracing::warn!(service = %service, path = service.mount_path(), "Service stub mounted")
            }
        }

        statuses.push(ServiceStatus { service, state });
        router.nest_service(service.mount_path(), group)
    });

    (router, statuses)
}
