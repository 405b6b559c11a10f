//! GCP compute instance metadata probe
use crate::cloud::http_client::{build_request, HttpTransport};
use crate::config::ProbeConfig;
use crate::metadata::Provider;
use crate::probe::{logged, probe_document, Budget, Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tracing::instrument;

/// Path and query of the GCP instance metadata endpoint.
pub const GCP_METADATA_PATH: &str = "/computeMetadata/v1/instance/?recursive=true";

const HEADER_KEY: &str = "metadata-flavor";
const HEADER_VALUE: &str = "Google";

/// The `GCPDetector` struct encapsulates the transport used to retrieve the instance metadata.
pub struct GCPDetector<T: HttpTransport> {
    transport: T,
    headers: HeaderMap,
}

impl<T: HttpTransport> GCPDetector<T> {
    /// Returns a new instance of GCPDetector
    pub fn new(transport: T) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(HEADER_KEY),
            HeaderValue::from_static(HEADER_VALUE),
        );

        Self { transport, headers }
    }
}

#[async_trait]
impl<T: HttpTransport> Probe for GCPDetector<T> {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    #[instrument(skip_all, name = "probe_gcp")]
    async fn probe(&self, config: &ProbeConfig) -> ProbeOutcome {
        let budget = Budget::start(config);
        logged(Provider::Gcp, async {
            let request = build_request(
                Method::GET,
                config.url(GCP_METADATA_PATH),
                self.headers.clone(),
            )
            .map_err(|source| ProbeError::Transport {
                provider: Provider::Gcp,
                source,
            })?;

            probe_document(&self.transport, Provider::Gcp, request, config, budget).await
        })
        .await
    }
}
