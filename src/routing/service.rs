//! The fixed set of sub-services mounted behind the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sub-service route group mounted under `/api/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Auth,
    Sales,
    Analytics,
    Upload,
    Chatbot,
}

impl Service {
    /// All services in mount order.
    pub const ALL: [Service; 5] = [
        Service::Auth,
        Service::Sales,
        Service::Analytics,
        Service::Upload,
        Service::Chatbot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::Auth => "auth",
            Service::Sales => "sales",
            Service::Analytics => "analytics",
            Service::Upload => "upload",
            Service::Chatbot => "chatbot",
        }
    }

    /// Path prefix the route group is mounted at.
    pub fn mount_path(self) -> &'static str {
        match self {
            Service::Auth => "/api/auth",
            Service::Sales => "/api/sales",
            Service::Analytics => "/api/analytics",
            Service::Upload => "/api/upload",
            Service::Chatbot => "/api/chatbot",
        }
    }

    /// Fixed message returned by the degraded stub for this service.
    pub fn unavailable_message(self) -> &'static str {
        match self {
            Service::Auth => "Authentication service is temporarily unavailable",
            Service::Sales => "Sales service is temporarily unavailable",
            Service::Analytics => "Analytics service is temporarily unavailable",
            Service::Upload => "Upload service is temporarily unavailable",
            Service::Chatbot => "Chatbot service is temporarily unavailable",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
