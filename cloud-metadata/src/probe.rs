//! Single-shot probing of a metadata server.
//!
//! A probe has two budgets, both starting when the probe starts:
//! - the connect budget bounds the wait for the response head,
//! - the total budget bounds the whole exchange, body included.
//!
//! Whichever terminal event happens first resolves the probe and drops
//! everything else: the connection handle and the other timer.
use crate::cloud::http_client::{HttpTransport, TransportError};
use crate::config::ProbeConfig;
use crate::metadata::{CanonicalMetadata, Provider};
use crate::normalizer::normalize_with;
use async_trait::async_trait;
use http::Request;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace};

/// Result of one probe attempt.
pub type ProbeOutcome = Result<CanonicalMetadata, ProbeError>;

/// Kind of a [ProbeError], for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectTimeout,
    RequestTimeout,
    Transport,
    UnsuccessfulResponse,
    Parse,
    NotDetected,
}

#[derive(Error, Debug)]
pub enum ProbeError {
    /// No response head within the connect budget.
    #[error("could not reach {0} metadata server")]
    ConnectTimeout(Provider),
    /// The full response was not received within the total budget.
    #[error("request to {0} metadata server timed out")]
    RequestTimeout(Provider),
    #[error("error reaching {provider} metadata server: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: TransportError,
    },
    #[error("{provider} metadata server responded with status code `{code}`, reason: `{reason}`")]
    UnsuccessfulResponse {
        provider: Provider,
        code: u16,
        reason: String,
    },
    #[error("{provider} metadata server responded, but there was an error parsing the result: {source}")]
    Parse {
        provider: Provider,
        #[source]
        source: serde_json::Error,
    },
    /// None of the candidate providers matched. Holds the errors of the probes
    /// that failed.
    #[error("no cloud provider detected")]
    NotDetected(Vec<ProbeError>),
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::ConnectTimeout(_) => ErrorKind::ConnectTimeout,
            ProbeError::RequestTimeout(_) => ErrorKind::RequestTimeout,
            ProbeError::Transport { .. } => ErrorKind::Transport,
            ProbeError::UnsuccessfulResponse { .. } => ErrorKind::UnsuccessfulResponse,
            ProbeError::Parse { .. } => ErrorKind::Parse,
            ProbeError::NotDetected(_) => ErrorKind::NotDetected,
        }
    }

    /// The provider whose probe failed, `None` for aggregated errors.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            ProbeError::ConnectTimeout(provider)
            | ProbeError::RequestTimeout(provider)
            | ProbeError::Transport { provider, .. }
            | ProbeError::UnsuccessfulResponse { provider, .. }
            | ProbeError::Parse { provider, .. } => Some(*provider),
            ProbeError::NotDetected(_) => None,
        }
    }
}

/// One attempt to reach and interpret a provider's metadata server.
#[async_trait]
pub trait Probe: Send + Sync {
    fn provider(&self) -> Provider;

    /// Probes the metadata server described by `config` once.
    async fn probe(&self, config: &ProbeConfig) -> ProbeOutcome;
}

/// Connect and total budgets of a running probe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Budget {
    connect_timeout: Duration,
    deadline: Instant,
}

impl Budget {
    pub(crate) fn start(config: &ProbeConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            deadline: Instant::now() + config.total_timeout,
        }
    }
}

/// Sends `request` and collects the response body within `budget`.
///
/// The connection handle lives inside the exchange future, so it is dropped
/// exactly once whichever way the exchange ends.
pub(crate) async fn fetch<T: HttpTransport + ?Sized>(
    transport: &T,
    provider: Provider,
    request: Request<Vec<u8>>,
    budget: Budget,
) -> Result<Vec<u8>, ProbeError> {
    let exchange = async {
        let mut response = match timeout(budget.connect_timeout, transport.send(request)).await {
            Err(_elapsed) => return Err(ProbeError::ConnectTimeout(provider)),
            Ok(response) => {
                response.map_err(|source| ProbeError::Transport { provider, source })?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::UnsuccessfulResponse {
                provider,
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| ProbeError::Transport { provider, source })?
        {
            body.extend_from_slice(&chunk);
        }
        Ok::<_, ProbeError>(body)
    };

    timeout_at(budget.deadline, exchange)
        .await
        .unwrap_or(Err(ProbeError::RequestTimeout(provider)))
}

/// Fetches, parses and normalizes the provider document.
pub(crate) async fn probe_document<T: HttpTransport + ?Sized>(
    transport: &T,
    provider: Provider,
    request: Request<Vec<u8>>,
    config: &ProbeConfig,
    budget: Budget,
) -> ProbeOutcome {
    fetch(transport, provider, request, budget)
        .await
        .and_then(|body| parse(provider, &body))
        .map(|document| normalize_with(provider, &document, config.missing_fields))
}

/// Awaits a whole probe and logs how it ended, whichever step failed.
pub(crate) async fn logged<F>(provider: Provider, probe: F) -> ProbeOutcome
where
    F: Future<Output = ProbeOutcome>,
{
    let outcome = probe.await;
    match &outcome {
        Ok(metadata) if metadata.provider().is_none() => {
            trace!(%provider, "metadata server responded with a document from another provider")
        }
        Ok(_) => debug!(%provider, "cloud metadata retrieved"),
        Err(err) => debug!(%provider, error = %err, "cloud metadata probe failed"),
    }
    outcome
}

fn parse(provider: Provider, body: &[u8]) -> Result<Value, ProbeError> {
    serde_json::from_slice(body).map_err(|source| ProbeError::Parse { provider, source })
}
