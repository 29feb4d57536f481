//! Upstream forwarder.
//!
//! The collaborator the binary ships with: relays every request under a
//! service prefix to a configured HTTP upstream and streams the answer back.
//! Method, original path and query, headers and body pass through untouched
//! apart from hop-by-hop headers.

use axum::{
    body::Body,
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{
        header::{self, HeaderName},
        uri::Authority,
        HeaderMap, HeaderValue, Uri, Version,
    },
    response::Response,
    Router,
};
use http_body_util::LengthLimitError;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::validation::check_upstream;
use crate::error::GatewayError;
use crate::routing::collaborator::LoadError;
use crate::routing::Service;

static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Pooled HTTP client shared by all forwarders.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Client<HttpConnector, Body>,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self {
            inner: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwarder for one service.
#[derive(Clone)]
pub struct UpstreamService {
    service: Service,
    authority: Authority,
    /// Path prefix of the upstream base URL, without trailing slash.
    base_path: String,
    client: UpstreamClient,
}

impl UpstreamService {
    pub fn new(service: Service, base: &str, client: UpstreamClient) -> Result<Self, LoadError> {
        let invalid = |reason: String| LoadError::InvalidUpstream {
            url: base.to_string(),
            reason,
        };

        let url = check_upstream(base).map_err(&invalid)?;
        let host = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            service,
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn into_router(self) -> Router {
        Router::new().fallback(forward).with_state(self)
    }

    fn target_uri(&self, original: &Uri) -> Result<Uri, GatewayError> {
        let path_and_query = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        Uri::builder()
            .scheme("http")
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build upstream URI: {e}")))
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Whether a relay failed because the body-limit layer cut off a streamed
/// request body.
fn exceeded_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

async fn forward(
    State(upstream): State<UpstreamService>,
    OriginalUri(original): OriginalUri,
    request: Request,
) -> Result<Response, GatewayError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream.target_uri(&original)?;
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        if let Ok(value) = HeaderValue::from_str(&peer.ip().to_string()) {
            parts.headers.append("x-forwarded-for", value);
        }
    }

    tracing::debug!(
        service = %upstream.service,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding to upstream"
    );

    let response: Response<Incoming> = upstream
        .client
        .inner
        .request(Request::from_parts(parts, body))
        .await
        .map_err(|e| {
            if exceeded_body_limit(&e) {
                tracing::warn!(service = %upstream.service, "Request body over limit, relay aborted");
                GatewayError::PayloadTooLarge
            } else {
                GatewayError::Upstream {
                    service: upstream.service,
                    message: e.to_string(),
                }
            }
        })?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
