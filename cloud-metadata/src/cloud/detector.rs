//! Cloud provider detection across every supported metadata server
use crate::cloud::aws::detector::AWSDetector;
use crate::cloud::azure::detector::AzureDetector;
use crate::cloud::gcp::detector::GCPDetector;
use crate::cloud::http_client::{HttpTransport, ReqwestTransport, TransportError};
use crate::config::DetectionConfig;
use crate::metadata::Provider;
use crate::probe::{Probe, ProbeError, ProbeOutcome};
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tracing::{debug, instrument};

/// The `CloudDetector` struct holds one probe per supported provider.
///
/// Probes are generic so any [Probe] implementation can stand in for a provider.
pub struct CloudDetector<AWS: Probe, GCP: Probe, AZURE: Probe> {
    aws_detector: AWS,
    gcp_detector: GCP,
    azure_detector: AZURE,
}

impl<T> CloudDetector<AWSDetector<T>, GCPDetector<T>, AzureDetector<T>>
where
    T: HttpTransport + Clone,
{
    /// Returns a new instance of CloudDetector whose probes share `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            aws_detector: AWSDetector::new(transport.clone()),
            gcp_detector: GCPDetector::new(transport.clone()),
            azure_detector: AzureDetector::new(transport),
        }
    }

    /// Requests an IMDSv2 session token before reading the AWS identity document.
    pub fn with_aws_imds_v2(self, token_ttl: Duration) -> Self {
        Self {
            aws_detector: self.aws_detector.with_imds_v2(token_ttl),
            ..self
        }
    }
}

impl
    CloudDetector<
        AWSDetector<ReqwestTransport>,
        GCPDetector<ReqwestTransport>,
        AzureDetector<ReqwestTransport>,
    >
{
    /// Builds a detector on top of a [ReqwestTransport].
    pub fn try_default() -> Result<Self, TransportError> {
        Ok(Self::new(ReqwestTransport::try_new()?))
    }
}

impl<AWS, GCP, AZURE> CloudDetector<AWS, GCP, AZURE>
where
    AWS: Probe,
    GCP: Probe,
    AZURE: Probe,
{
    pub fn from_probes(aws_detector: AWS, gcp_detector: GCP, azure_detector: AZURE) -> Self {
        Self {
            aws_detector,
            gcp_detector,
            azure_detector,
        }
    }

    fn probe_for(&self, provider: Provider) -> &dyn Probe {
        match provider {
            Provider::Aws => &self.aws_detector,
            Provider::Gcp => &self.gcp_detector,
            Provider::Azure => &self.azure_detector,
        }
    }

    /// Probes the `candidates` metadata servers.
    ///
    /// A single candidate is probed directly and its outcome returned as is.
    /// Several candidates are probed concurrently: the first metadata that
    /// names its provider is returned and every other probe is dropped.
    #[instrument(skip_all, name = "detect_cloud")]
    pub async fn detect(&self, candidates: &[Provider], config: &DetectionConfig) -> ProbeOutcome {
        let mut providers = Vec::with_capacity(candidates.len());
        for provider in candidates {
            if !providers.contains(provider) {
                providers.push(*provider);
            }
        }

        match providers.as_slice() {
            [] => Err(ProbeError::NotDetected(Vec::new())),
            [provider] => {
                self.probe_for(*provider)
                    .probe(config.for_provider(*provider))
                    .await
            }
            providers => self.race(providers, config).await,
        }
    }

    /// Probes AWS, GCP and Azure concurrently.
    pub async fn detect_all(&self, config: &DetectionConfig) -> ProbeOutcome {
        self.detect(&Provider::ALL, config).await
    }

    async fn race(&self, providers: &[Provider], config: &DetectionConfig) -> ProbeOutcome {
        let mut probes: FuturesUnordered<_> = providers
            .iter()
            .map(|provider| {
                self.probe_for(*provider)
                    .probe(config.for_provider(*provider))
            })
            .collect();

        let mut errors = Vec::new();
        while let Some(outcome) = probes.next().await {
            match outcome {
                Ok(metadata) => {
                    if let Some(provider) = metadata.provider() {
                        debug!(%provider, pending = probes.len(), "cloud provider detected");
                        return Ok(metadata);
                    }
                }
                Err(err) => errors.push(err),
            }
        }

        debug!(failed = errors.len(), "no cloud provider detected");
        Err(ProbeError::NotDetected(errors))
    }
}
