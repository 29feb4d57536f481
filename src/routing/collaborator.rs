//! Collaborator registry.
//!
//! A collaborator is whatever produces the route group for one [`Service`].
//! The gateway never looks inside; it only asks each factory for a
//! `Router` at startup and mounts it under the service prefix.

use axum::Router;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::routing::upstream::{UpstreamClient, UpstreamService};
use crate::routing::Service;

/// Why a collaborator could not produce its route group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no collaborator registered")]
    Missing,

    #[error("invalid upstream {url:?}: {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("initialization failed: {0}")]
    Failed(String),

    #[error("panicked during initialization: {0}")]
    Panicked(String),
}

/// Builds the route group for one service.
pub trait ServiceFactory: Send + Sync {
    fn build(&self) -> Result<Router, LoadError>;
}

impl<F> ServiceFactory for F
where
    F: Fn() -> Result<Router, LoadError> + Send + Sync,
{
    fn build(&self) -> Result<Router, LoadError> {
        self()
    }
}

/// Factories for the five services, keyed by service.
#[derive(Default)]
pub struct Collaborators {
    factories: BTreeMap<Service, Box<dyn ServiceFactory>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `service`.
    pub fn register(mut self, service: Service, factory: impl ServiceFactory + 'static) -> Self {
        self.factories.insert(service, Box::new(factory));
        self
    }

    /// Upstream forwarders for every service configured with an upstream.
    /// Services without one are left unregistered and will fail to load.
    pub fn from_upstreams(upstreams: &BTreeMap<Service, UpstreamConfig>) -> Self {
        let client = UpstreamClient::new();
        upstreams
            .iter()
            .fold(Self::new(), |collaborators, (service, upstream)| {
                let service = *service;
                let base = upstream.upstream.clone();
                let client = client.clone();
                collaborators.register(service, move || {
                    UpstreamService::new(service, &base, client.clone()).map(UpstreamService::into_router)
                })
            })
    }

    pub fn is_registered(&self, service: Service) -> bool {
        self.factories.contains_key(&service)
    }

    /// Run the factory for `service`, turning panics into load errors.
    pub fn load(&self, service: Service) -> Result<Router, LoadError> {
        let factory = self.factories.get(&service).ok_or(LoadError::Missing)?;
        panic::catch_unwind(AssertUnwindSafe(|| factory.build()))
            .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(payload.as_ref()))))
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_factory() {
        let collaborators = Collaborators::new();
        assert_eq!(collaborators.load(Service::Auth).unwrap_err(), LoadError::Missing);
    }

    #[test]
    fn test_factory_error_is_returned() {
        let collaborators = Collaborators::new().register(Service::Sales, || -> Result<Router, LoadError> {
            Err(LoadError::Failed("schema mismatch".into()))
        });
        assert_eq!(
            collaborators.load(Service::Sales).unwrap_err(),
            LoadError::Failed("schema mismatch".into())
        );
    }

    #[test]
    fn test_factory_panic_is_contained() {
        let collaborators = Collaborators::new().register(Service::Chatbot, || -> Result<Router, LoadError> {
            panic!("model file missing")
        });
        assert_eq!(
            collaborators.load(Service::Chatbot).unwrap_err(),
            LoadError::Panicked("model file missing".into())
        );
    }

    #[test]
    fn test_from_upstreams_registers_configured_services_only() {
        let mut upstreams = BTreeMap::new();
        upstreams.insert(
            Service::Auth,
            UpstreamConfig {
                upstream: "http://127.0.0.1:4001".into(),
            },
        );
        upstreams.insert(
            Service::Upload,
            UpstreamConfig {
                upstream: "mailto:nobody".into(),
            },
        );
        let collaborators = Collaborators::from_upstreams(&upstreams);

        assert!(collaborators.load(Service::Auth).is_ok());
        assert!(matches!(
            collaborators.load(Service::Upload),
            Err(LoadError::InvalidUpstream { .. })
        ));
        assert_eq!(collaborators.load(Service::Sales).unwrap_err(), LoadError::Missing);
    }
}
