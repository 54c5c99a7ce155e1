//! HTTP exchange used by the client.
//!
//! [`Transport`] performs exactly one request/response round trip and
//! reports only transport failures; interpreting the status code and body is
//! left to the client. [`HyperTransport`] is the production implementation.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use pilosa_common::{PilosaError, Result};

/// Body encoding of a request, which also selects the expected response encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Json,
    Protobuf,
}

impl Codec {
    pub fn content_type(&self) -> &'static str {
        match self {
            Codec::Json => "application/json",
            Codec::Protobuf => "application/x-protobuf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub codec: Codec,
    pub body: Bytes,
}

/// Status and fully read body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and reads the whole response body.
    ///
    /// Fails only when no complete response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// HTTP/1.1 transport over hyper's client.
///
/// Both `http` and `https` hosts are reachable; TLS uses rustls with the
/// webpki root certificates. Connection reuse is whatever hyper's client
/// provides; no pooling policy is configured here.
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    max_response_size: usize,
}

impl HyperTransport {
    pub fn new(max_response_size: usize) -> Self {
        // Install crypto provider if not already installed
        let _ = rustls::crypto::ring::default_provider().install_default();

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            max_response_size,
        }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let content_type = request.codec.content_type();
        let http_request = Request::builder()
            .method(request.method)
            .uri(request.url.as_str())
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, content_type)
            .body(Full::new(request.body))
            .map_err(|e| PilosaError::Transport(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| PilosaError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = Limited::new(response.into_body(), self.max_response_size)
            .collect()
            .await
            .map_err(|e| PilosaError::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        Ok(HttpResponse { status, body })
    }
}
