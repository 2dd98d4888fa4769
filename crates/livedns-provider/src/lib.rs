// # LiveDNS Zone Provider
//
// This crate implements `DnsProvider` against the LiveDNS DomainsAPI.asmx
// SOAP 1.1 service.
//
// ## Operations
//
// | Trait method          | SOAP operation   | Extra parameters          |
// |-----------------------|------------------|---------------------------|
// | `list_zone_records`   | `GetZoneRecords` | (none)                    |
// | `delete_a_record`     | `DeleteARecord`  | `HostName`                |
// | `create_a_record`     | `NewARecord`     | `HostName`, `IPAddress`, `TTL` |
//
// Every call carries `UserName`, `Password` and `DomainName`.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no caching
// - HTTP timeout of 30 seconds
// - HTTP status codes and SOAP faults map to `Err`
// - `DeleteARecord` answering "A Record does not exists" maps to
//   `DeleteOutcome::NotFound`
// - `NewARecord` answering `1` maps to `CreateOutcome::Created`; any other
//   answer is `CreateOutcome::Rejected`
// - Dry-run mode performs the zone listing but only logs mutations
//
// ## Security Requirements
//
// - The password NEVER appears in logs or error messages
// - Request envelopes are never logged, since they embed the password

mod soap;

use async_trait::async_trait;
use livedns_core::config::Credentials;
use livedns_core::traits::{CreateOutcome, DeleteOutcome, DnsProvider, RecordType, ZoneRecord};
use livedns_core::{Error, Result};
use std::time::Duration;

/// Production SOAP endpoint
pub const LIVEDNS_ENDPOINT: &str = "https://domains.livedns.co.il/API/DomainsAPI.asmx";

/// XML namespace of the service contract
pub const DEFAULT_NAMESPACE: &str = "http://tempuri.org/";

/// `DeleteARecord` reply meaning the host had no A record
pub const RECORD_NOT_FOUND_REPLY: &str = "A Record does not exists";

/// `NewARecord` reply meaning the record was created
pub const CREATE_OK_REPLY: &str = "1";

/// Type label the service uses for A records
pub const A_RECORD_LABEL: &str = "Host (A)";

/// Any type label ending in this names an A record
const A_LABEL_SUFFIX: &str = "(A)";

/// Type label the service uses for name server records
const NS_RECORD_LABEL: &str = "Name Server (NS)";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "livedns";

/// LiveDNS SOAP provider
///
/// Stateless: credentials are passed on every call, so one provider value can
/// serve any account.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform `GetZoneRecords` normally
/// - Log intended deletes and creates
/// - **NOT** modify the zone; mutations report `Removed` and `Created`
pub struct LiveDnsProvider {
    /// SOAP endpoint URL
    endpoint: String,

    /// Service namespace, used in the body and the `SOAPAction` header
    namespace: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list the zone but skip mutations
    dry_run: bool,
}

impl std::fmt::Debug for LiveDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDnsProvider")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl LiveDnsProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: SOAP endpoint URL, normally [`LIVEDNS_ENDPOINT`]
    /// - `dry_run`: If true, list the zone but skip deletes and creates
    pub fn new(endpoint: impl Into<String>, dry_run: bool) -> Result<Self> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::config(format!(
                "Invalid LiveDNS endpoint (expected http or https URL): {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            namespace: DEFAULT_NAMESPACE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider against the production endpoint (live mode)
    pub fn new_live() -> Result<Self> {
        Self::new(LIVEDNS_ENDPOINT, false)
    }

    /// Create a provider against the production endpoint (dry-run mode)
    pub fn new_dry_run() -> Result<Self> {
        Self::new(LIVEDNS_ENDPOINT, true)
    }

    /// Override the service namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one operation and return the response body
    async fn call(
        &self,
        operation: &str,
        credentials: &Credentials,
        params: &[(&str, &str)],
    ) -> Result<String> {
        let body = soap::envelope(&self.namespace, operation, credentials, params);

        tracing::debug!(operation, endpoint = %self.endpoint, "Sending SOAP request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(&self.namespace, operation))
            .body(body)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return Ok(text);
        }

        // ASMX reports SOAP faults with status 500; surface the fault text
        if let Some(fault) = soap::parse_fault(&text) {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("{} failed with SOAP fault: {}", operation, fault),
            ));
        }

        match status.as_u16() {
            401 | 403 => Err(Error::provider(
                PROVIDER_NAME,
                format!("{} refused: check username and password. Status: {}", operation, status),
            )),
            404 => Err(Error::provider(
                PROVIDER_NAME,
                format!("No SOAP service at {}. Status: {}", self.endpoint, status),
            )),
            429 => Err(Error::provider(
                PROVIDER_NAME,
                format!("{} throttled by LiveDNS. Status: {}", operation, status),
            )),
            500..=599 => Err(Error::provider(
                PROVIDER_NAME,
                format!("{} failed with LiveDNS server error: {}", operation, status),
            )),
            _ => Err(Error::provider(
                PROVIDER_NAME,
                format!("{} failed: {}", operation, status),
            )),
        }
    }
}

/// Convert a raw record, dropping name server entries
fn convert_record(raw: soap::RawZoneRecord, fallback_ttl: u32) -> Option<ZoneRecord> {
    let record_type = match raw.record_type.as_str() {
        NS_RECORD_LABEL => return None,
        label if label == A_RECORD_LABEL || label.ends_with(A_LABEL_SUFFIX) => RecordType::A,
        other => RecordType::Other(other.to_string()),
    };

    let ttl = match raw.ttl.trim().parse::<u32>() {
        Ok(ttl) => ttl,
        Err(_) => {
            tracing::warn!(
                host = %raw.host,
                ttl = %raw.ttl,
                "Unparsable TTL in zone listing, using {}",
                fallback_ttl
            );
            fallback_ttl
        }
    };

    Some(ZoneRecord {
        host: raw.host,
        record_type,
        data: raw.data,
        ttl,
    })
}

#[async_trait]
impl DnsProvider for LiveDnsProvider {
    async fn list_zone_records(&self, credentials: &Credentials) -> Result<Vec<ZoneRecord>> {
        let xml = self.call("GetZoneRecords", credentials, &[]).await?;
        let records: Vec<ZoneRecord> = soap::parse_zone_records(&xml)?
            .into_iter()
            .filter_map(|raw| convert_record(raw, livedns_core::config::DEFAULT_TTL))
            .collect();

        tracing::debug!(
            domain = %credentials.domain,
            records = records.len(),
            "Zone listing received"
        );
        Ok(records)
    }

    async fn delete_a_record(&self, credentials: &Credentials, host: &str) -> Result<DeleteOutcome> {
        if self.dry_run {
            tracing::info!("[DRY-RUN] Would delete A record {:?} in {}", host, credentials.domain);
            return Ok(DeleteOutcome::Removed);
        }

        let xml = self
            .call("DeleteARecord", credentials, &[("HostName", host)])
            .await?;
        let reply = soap::parse_result(&xml, "DeleteARecord")?;

        if reply.trim() == RECORD_NOT_FOUND_REPLY {
            Ok(DeleteOutcome::NotFound { reason: reply })
        } else {
            Ok(DeleteOutcome::Removed)
        }
    }

    async fn create_a_record(
        &self,
        credentials: &Credentials,
        host: &str,
        ip: &str,
        ttl: u32,
    ) -> Result<CreateOutcome> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would create A record {:?} -> {} (ttl {}) in {}",
                host,
                ip,
                ttl,
                credentials.domain
            );
            return Ok(CreateOutcome::Created);
        }

        let ttl = ttl.to_string();
        let xml = self
            .call(
                "NewARecord",
                credentials,
                &[("HostName", host), ("IPAddress", ip), ("TTL", &ttl)],
            )
            .await?;
        let reply = soap::parse_result(&xml, "NewARecord")?;

        if reply.trim() == CREATE_OK_REPLY {
            Ok(CreateOutcome::Created)
        } else {
            Ok(CreateOutcome::Rejected { reason: reply })
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
