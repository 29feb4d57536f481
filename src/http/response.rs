//! Response helpers shared by the middleware stack.
//!
//! # Responsibilities
//! - Turn a caught handler panic into the generic 500 envelope

use axum::response::{IntoResponse, Response};
use std::any::Any;

use crate::error::GatewayError;
use crate::routing::collaborator::panic_message;

/// Responder for `CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(payload.as_ref());
    tracing::error!(panic = %message, "Handler panicked");
    GatewayError::Internal(message).into_response()
}
