//! Configuration supplied by the caller for each detection run.
use crate::metadata::Provider;
use duration_str::deserialize_duration;
use serde::{Deserialize, Deserializer};
use std::fmt::{Display, Formatter};
use std::net::Ipv6Addr;
use std::time::Duration;

/// Link-local address shared by the AWS and Azure metadata servers.
pub const DEFAULT_HOST: &str = "169.254.169.254";
/// Host name of the GCP metadata server.
pub const GCP_DEFAULT_HOST: &str = "metadata.google.internal";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Https => f.write_str("https"),
        }
    }
}

/// How a field missing from the provider document is represented in the
/// canonical metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// The field becomes the literal string `"undefined"`, matching the output
    /// existing consumers were built against.
    #[default]
    Undefined,
    /// The field becomes `null`.
    Null,
}

/// Where and how to reach one metadata server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    /// Budget for receiving the response head.
    #[serde(deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,
    /// Budget for the whole exchange, body included.
    #[serde(deserialize_with = "deserialize_duration")]
    pub total_timeout: Duration,
    pub missing_fields: MissingFieldPolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            protocol: Protocol::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            missing_fields: MissingFieldPolicy::default(),
        }
    }
}

impl ProbeConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_protocol(self, protocol: Protocol) -> Self {
        Self { protocol, ..self }
    }

    pub fn with_connect_timeout(self, connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            ..self
        }
    }

    pub fn with_total_timeout(self, total_timeout: Duration) -> Self {
        Self {
            total_timeout,
            ..self
        }
    }

    pub fn with_missing_fields(self, missing_fields: MissingFieldPolicy) -> Self {
        Self {
            missing_fields,
            ..self
        }
    }

    /// Full URL for `path_and_query` on this metadata server.
    /// IPv6 literals are bracketed, e.g. `http://[fd00:ec2::254]:80/`.
    pub fn url(&self, path_and_query: &str) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!(
                "{}://[{}]:{}{}",
                self.protocol, self.host, self.port, path_and_query
            )
        } else {
            format!(
                "{}://{}:{}{}",
                self.protocol, self.host, self.port, path_and_query
            )
        }
    }
}

/// Per-provider probe configuration for a detection run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub aws: ProbeConfig,
    #[serde(deserialize_with = "deserialize_gcp_config")]
    pub gcp: ProbeConfig,
    pub azure: ProbeConfig,
}

/// GCP keeps its own default host when only some fields are set.
fn deserialize_gcp_config<'de, D>(deserializer: D) -> Result<ProbeConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct GcpProbeConfig {
        #[serde(default = "gcp_default_host")]
        host: String,
        #[serde(flatten)]
        config: ProbeConfig,
    }

    let GcpProbeConfig { host, config } = GcpProbeConfig::deserialize(deserializer)?;
    Ok(ProbeConfig { host, ..config })
}

fn gcp_default_host() -> String {
    GCP_DEFAULT_HOST.to_string()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            aws: ProbeConfig::default(),
            gcp: ProbeConfig {
                host: gcp_default_host(),
                ..Default::default()
            },
            azure: ProbeConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Uses the same configuration for every provider.
    pub fn uniform(config: ProbeConfig) -> Self {
        Self {
            aws: config.clone(),
            gcp: config.clone(),
            azure: config,
        }
    }

    pub fn for_provider(&self, provider: Provider) -> &ProbeConfig {
        match provider {
            Provider::Aws => &self.aws,
            Provider::Gcp => &self.gcp,
            Provider::Azure => &self.azure,
        }
    }
}
