//! AWS EC2 instance identity probe
use super::http_client::session_token_headers;
use crate::cloud::http_client::{build_request, HttpTransport};
use crate::config::ProbeConfig;
use crate::metadata::Provider;
use crate::probe::{logged, probe_document, Budget, Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use http::{HeaderMap, Method};
use std::time::Duration;
use tracing::{debug, instrument};

/// Path of the AWS instance identity document.
pub const AWS_METADATA_PATH: &str = "/latest/dynamic/instance-identity/document";

/// Default lifetime requested for IMDSv2 session tokens.
pub const TTL_TOKEN_DEFAULT: Duration = Duration::from_secs(300);

/// The `AWSDetector` struct encapsulates the transport used to retrieve the instance identity.
///
/// By default it performs a single IMDSv1 request. With [AWSDetector::with_imds_v2] it first
/// requests a session token and falls back to IMDSv1 when the token can't be obtained.
pub struct AWSDetector<T: HttpTransport> {
    transport: T,
    token_ttl: Option<Duration>,
}

impl<T: HttpTransport> AWSDetector<T> {
    /// Returns a new instance of AWSDetector
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            token_ttl: None,
        }
    }

    pub fn with_imds_v2(self, token_ttl: Duration) -> Self {
        Self {
            token_ttl: Some(token_ttl),
            ..self
        }
    }

    async fn request_headers(
        &self,
        config: &ProbeConfig,
        budget: Budget,
    ) -> Result<HeaderMap, ProbeError> {
        let Some(token_ttl) = self.token_ttl else {
            return Ok(HeaderMap::new());
        };

        match session_token_headers(&self.transport, config, token_ttl, budget).await {
            Ok(headers) => Ok(headers),
            Err(err @ ProbeError::RequestTimeout(_)) => Err(err),
            Err(err) => {
                debug!(error = %err, "could not get an IMDSv2 session token, falling back to IMDSv1");
                Ok(HeaderMap::new())
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> Probe for AWSDetector<T> {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    #[instrument(skip_all, name = "probe_aws")]
    async fn probe(&self, config: &ProbeConfig) -> ProbeOutcome {
        let budget = Budget::start(config);
        logged(Provider::Aws, async {
            let headers = self.request_headers(config, budget).await?;
            let request = build_request(Method::GET, config.url(AWS_METADATA_PATH), headers)
                .map_err(|source| ProbeError::Transport {
                    provider: Provider::Aws,
                    source,
                })?;

            probe_document(&self.transport, Provider::Aws, request, config, budget).await
        })
        .await
    }
}
