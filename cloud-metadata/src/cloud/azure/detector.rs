//! Azure virtual machine metadata probe
use crate::cloud::http_client::{build_request, HttpTransport};
use crate::config::ProbeConfig;
use crate::metadata::Provider;
use crate::probe::{logged, probe_document, Budget, Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tracing::instrument;

/// Path and query of the Azure instance metadata endpoint.
pub const AZURE_METADATA_PATH: &str = "/metadata/instance?api-version=2020-09-01";

const HEADER_KEY: &str = "metadata";
const HEADER_VALUE: &str = "true";

/// The `AzureDetector` struct encapsulates the transport used to retrieve the instance metadata.
pub struct AzureDetector<T: HttpTransport> {
    transport: T,
    headers: HeaderMap,
}

impl<T: HttpTransport> AzureDetector<T> {
    /// Returns a new instance of AzureDetector
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
impl<T: HttpTransport> Probe for AzureDetector<T> {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    #[instrument(skip_all, name = "probe_azure")]
    async fn probe(&self, config: &ProbeConfig) -> ProbeOutcome {
        let budget = Budget::start(config);
        logged(Provider::Azure, async {
            let request = build_request(
                Method::GET,
                config.url(AZURE_METADATA_PATH),
                self.headers.clone(),
            )
            .map_err(|source| ProbeError::Transport {
                provider: Provider::Azure,
                source,
            })?;

            probe_document(&self.transport, Provider::Azure, request, config, budget).await
        })
        .await
    }
}
