//! Injectable request transport
//!
//! The client never talks to the network directly; it hands a fully built
//! [`TransportRequest`] to a [`Transport`] implementation. Production code
//! uses [`HttpTransport`] (reqwest); tests substitute [`StubTransport`] for
//! deterministic, network-free runs. Cancellation is cooperative: dropping
//! the returned future abandons the request.

use reqwest::header::HeaderMap;
use reqwest::Method;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// A fully built request, ready to dispatch
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including any query string
    pub url: String,
    /// Complete header set (accept, auth, content-type, correlation id)
    pub headers: HeaderMap,
    /// Encoded body bytes, if any
    pub body: Option<Vec<u8>>,
}

/// A raw response as seen on the wire
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Build a JSON response (sets `Content-Type: application/json`)
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Self {
            status,
            headers,
            body: body.to_string().into_bytes(),
        }
    }

    /// Build a plain-text response with an explicit content type
    #[must_use]
    pub fn text(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static(content_type),
        );
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
        }
    }

    /// The `Content-Type` header value, if readable
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

/// Failure of the transport call itself, before any response arrived
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Underlying failure description
    pub message: String,
}

impl TransportError {
    /// Create a transport error from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Boxed future returned by [`Transport::send`]
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// The injectable seam between the client and the network
pub trait Transport: Send + Sync {
    /// Dispatch one request and read the full response body
    fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Default transport over a shared `reqwest::Client`
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { inner })
    }

    /// Wrap an existing `reqwest::Client`
    #[must_use]
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let mut builder = self
                .inner
                .request(request.method, &request.url)
                .headers(request.headers);

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(TransportError::from)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        })
    }
}

/// Scripted transport for tests
///
/// Returns queued outcomes in order and records every dispatched request so
/// assertions can inspect URLs, headers and bodies. An exhausted queue yields
/// a transport error rather than panicking inside client code.
#[derive(Default)]
pub struct StubTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    /// An empty stub; every call fails until a response is queued
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response
    pub fn push_response(&self, response: TransportResponse) {
        self.outcomes
            .lock()
            .expect("stub transport lock poisoned")
            .push_back(Ok(response));
    }

    /// Queue a JSON response
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(TransportResponse::json(status, &body));
    }

    /// Queue a transport-level failure
    pub fn push_error(&self, message: impl Into<String>) {
        self.outcomes
            .lock()
            .expect("stub transport lock poisoned")
            .push_back(Err(TransportError::new(message)));
    }

    /// Every request dispatched so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .expect("stub transport lock poisoned")
            .clone()
    }

    /// Number of requests dispatched so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("stub transport lock poisoned")
            .len()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("stub transport lock poisoned")
                .push(request);

            self.outcomes
                .lock()
                .expect("stub transport lock poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stub_returns_scripted_responses_in_order() {
        let stub = StubTransport::new();
        stub.push_json(200, json!({"data": []}));
        stub.push_error("connection refused");

        let request = TransportRequest {
            method: Method::GET,
            url: "https://cms.example.com/items/Products".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };

        let first = stub.send(request.clone()).await.expect("scripted ok");
        assert_eq!(first.status, 200);
        assert_eq!(first.content_type(), Some("application/json"));

        let second = stub.send(request.clone()).await;
        assert!(second.is_err());

        let third = stub.send(request).await;
        assert!(third.is_err(), "exhausted queue fails instead of panicking");
        assert_eq!(stub.request_count(), 3);
    }

    #[test]
    fn test_text_response_content_type() {
        let response = TransportResponse::text(200, "text/html", "<html></html>");
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.body, b"<html></html>");
    }
}
