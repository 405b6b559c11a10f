//! IMDSv2 session token retrieval.
use crate::cloud::http_client::{build_request, HttpTransport, TransportError};
use crate::config::ProbeConfig;
use crate::metadata::Provider;
use crate::probe::{fetch, Budget, ProbeError};
use core::str;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use std::time::Duration;

/// Path of the IMDSv2 session token endpoint.
pub const AWS_TOKEN_PATH: &str = "/latest/api/token";

pub(crate) const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
pub(crate) const TTL_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";

/// Requests a session token valid for `token_ttl` from the IMDSv2 token endpoint.
///
/// Returns the headers to add to metadata requests.
pub(crate) async fn session_token_headers<T: HttpTransport + ?Sized>(
    transport: &T,
    config: &ProbeConfig,
    token_ttl: Duration,
    budget: Budget,
) -> Result<HeaderMap, ProbeError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(TTL_TOKEN_HEADER),
        HeaderValue::from(token_ttl.as_secs()),
    );
    let request = build_request(Method::PUT, config.url(AWS_TOKEN_PATH), headers)
        .map_err(transport_error)?;

    let body = fetch(transport, Provider::Aws, request, budget).await?;

    let token = str::from_utf8(&body)
        .map_err(|err| {
            transport_error(TransportError::InvalidResponse(format!(
                "could not decode AWS IMDS token {err}"
            )))
        })?
        .trim();
    let token = HeaderValue::from_str(token).map_err(|err| {
        transport_error(TransportError::InvalidResponse(format!(
            "invalid AWS IMDS token {err}"
        )))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(TOKEN_HEADER), token);
    Ok(headers)
}

fn transport_error(source: TransportError) -> ProbeError {
    ProbeError::Transport {
        provider: Provider::Aws,
        source,
    }
}
