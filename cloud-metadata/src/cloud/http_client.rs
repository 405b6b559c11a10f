use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode};
use std::sync::Arc;
use thiserror::Error;

/// An enumeration of potential errors related to the HTTP transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Represents an error building the HTTP client.
    #[error("could not build the HTTP client: `{0}`")]
    BuildingError(String),
    /// Represents a request that could not be built or sent as is.
    #[error("invalid HTTP request: `{0}`")]
    InvalidRequest(String),
    /// Represents HTTP transport error (connection refused, DNS, reset...).
    #[error("transport HTTP client error: `{0}`")]
    TransportError(String),
    /// Represents an error while streaming the response body.
    #[error("error reading the response body: `{0}`")]
    BodyError(String),
    /// Represents a response that can't be used.
    #[error("invalid HTTP response: `{0}`")]
    InvalidResponse(String),
}

/// The `HttpTransport` trait defines how probes reach a metadata server.
///
/// `send` resolves as soon as the response head is available. The body is then
/// pulled from the returned [ResponseStream]; dropping the stream closes the
/// connection, and dropping the `send` future before it resolves aborts it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: Request<Vec<u8>>,
    ) -> Result<Box<dyn ResponseStream>, TransportError>;
}

/// A response whose body is still being received.
#[async_trait]
pub trait ResponseStream: Send {
    fn status(&self) -> StatusCode;

    /// Returns the next body chunk, or `None` once the body is complete.
    async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(
        &self,
        request: Request<Vec<u8>>,
    ) -> Result<Box<dyn ResponseStream>, TransportError> {
        self.as_ref().send(request).await
    }
}

/// Builds a body-less request with the provided method, url and headers.
pub(crate) fn build_request(
    method: Method,
    url: String,
    headers: HeaderMap,
) -> Result<Request<Vec<u8>>, TransportError> {
    let mut request = Request::builder()
        .method(method)
        .uri(url)
        .body(Vec::new())
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    request.headers_mut().extend(headers);
    Ok(request)
}

/// An implementation of the `HttpTransport` trait using the async reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client that never goes through a proxy: metadata servers are
    /// only reachable from the instance itself.
    ///
    /// Idle connections are not pooled, so every probe closes its connection
    /// once the response is consumed or dropped.
    pub fn try_new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::BuildingError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps a caller-built client. Its pool settings decide whether
    /// connections outlive the probe.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: Request<Vec<u8>>,
    ) -> Result<Box<dyn ResponseStream>, TransportError> {
        let request = reqwest::Request::try_from(request)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportError::TransportError(e.to_string()))?;
        Ok(Box::new(ReqwestResponseStream(response)))
    }
}

struct ReqwestResponseStream(reqwest::Response);

#[async_trait]
impl ResponseStream for ReqwestResponseStream {
    fn status(&self) -> StatusCode {
        self.0.status()
    }

    async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        self.0
            .chunk()
            .await
            .map_err(|e| TransportError::BodyError(e.to_string()))
    }
}
