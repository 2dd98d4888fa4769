// # HTTP IP Source
//
// This crate provides the public IP oracle for the LiveDNS updater: one GET
// against a plain-text echo service (https://api.ipify.org by default).
//
// ## Behavior
//
// - Exactly one request per `current()` call; no caching, no polling
// - HTTP timeout of 10 seconds
// - The body is trimmed and must parse as an IPv4 address
// - The address is returned in canonical dotted-quad form, so change
//   detection can compare it as plain text

use livedns_core::traits::IpSource;
use livedns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Default HTTP timeout for the echo service (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP echo-service IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the caller's address as plain text
    ///   (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config(format!(
                "Invalid IP service URL (expected http or https): {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and validate the current address
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        ip_text
            .parse::<Ipv4Addr>()
            .map_err(|_| Error::ip_source(format!("Invalid IPv4 address: {:?}", ip_text)))
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let ip = self.fetch_ip().await?;
        tracing::debug!(source = %self.url, %ip, "Public address resolved");
        Ok(ip.to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
