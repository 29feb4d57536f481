//! Request-level errors and the terminal error responder.
//!
//! Every failure raised while handling a request ends up as a
//! [`GatewayError`]; its `IntoResponse` impl is the single place that turns
//! errors into JSON envelopes, dispatching on the variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::routing::Service;

/// Top-level endpoints advertised by the 404 responder.
pub const AVAILABLE_ENDPOINTS: [&str; 7] = [
    "/",
    "/api/health",
    "/api/auth",
    "/api/sales",
    "/api/analytics",
    "/api/upload",
    "/api/chatbot",
];

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Declared origin is not on the allow-list.
    #[error("Origin {origin} is not allowed by CORS policy")]
    OriginDenied {
        origin: String,
        allowed_origins: Vec<String>,
    },

    /// No route matched the request path.
    #[error("no route for {path}")]
    NotFound { path: String },

    /// The service is mounted as a degraded stub.
    #[error("{}", .service.unavailable_message())]
    ServiceUnavailable { service: Service },

    /// The request body outgrew `limits.max_body_size` while being streamed.
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    /// Forwarding to the service's upstream failed.
    #[error("upstream for {service} failed: {message}")]
    Upstream { service: Service, message: String },

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::OriginDenied { .. } => StatusCode::FORBIDDEN,
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
enum ErrorBody<'a> {
    Cors {
        error: &'static str,
        details: String,
        origin: &'a str,
        allowed_origins: &'a [String],
    },
    NotFound {
        error: &'static str,
        path: &'a str,
        available_endpoints: &'static [&'static str],
    },
    Unavailable {
        error: &'static str,
        service: Service,
    },
    TooLarge {
        error: &'static str,
    },
    Upstream {
        error: &'static str,
        service: Service,
        message: &'a str,
    },
    Internal {
        error: &'static str,
        message: &'a str,
    },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::OriginDenied {
                origin,
                allowed_origins,
            } => ErrorBody::Cors {
                error: "CORS policy violation",
                details: self.to_string(),
                origin,
                allowed_origins,
            },
            GatewayError::NotFound { path } => ErrorBody::NotFound {
                error: "Route not found",
                path,
                available_endpoints: &AVAILABLE_ENDPOINTS,
            },
            GatewayError::ServiceUnavailable { service } => ErrorBody::Unavailable {
                error: service.unavailable_message(),
                service: *service,
            },
            GatewayError::PayloadTooLarge => ErrorBody::TooLarge {
                error: "Payload too large",
            },
            GatewayError::Upstream { service, message } => {
                tracing::error!(service = %service, error = %message, "Upstream request failed");
                ErrorBody::Upstream {
                    error: "Upstream request failed",
                    service: *service,
                    message,
                }
            }
            GatewayError::Internal(message) => {
                tracing::error!(error = %message, "Unhandled error");
                ErrorBody::Internal {
                    error: "Internal server error",
                    message,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
