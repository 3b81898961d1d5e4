//! The network seam.
//!
//! Every request this crate makes goes through a [`Transport`]. The default
//! [`ReqwestTransport`] wraps a shared `reqwest::Client`; callers that already
//! own an HTTP stack (proxies, recorders, test doubles) inject their own.
//!
//! A transport only moves bytes. It returns whatever status the server sent and
//! leaves classification to [`crate::normalize`]. An `Err` from a transport
//! means no HTTP response was obtained at all.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Boxed error of a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A fully prepared HTTP request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// JSON body, sent with the request when present.
    pub body: Option<serde_json::Value>,
}

/// Raw status and body of an HTTP response. The body is parsed lazily by the
/// normalizer so that non-JSON error pages can still be classified.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new<B: Into<Bytes>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one HTTP exchange.
///
/// Implementations own timeouts and cancellation. They must not retry
/// non-idempotent requests: `POST /payments` creates a transfer every time it
/// reaches the server.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing client (connection pool, proxy settings, TLS config).
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Applies a timeout to every request sent by this transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}
