// # IP Source Trait
//
// Defines the interface for obtaining the host's public-facing address.
//
// ## Implementations
//
// - HTTP echo service: `livedns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use livedns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let current_ip = source.current().await?;
//     println!("public address: {current_ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public IP source implementations
///
/// A run asks the source exactly once. There is no watching or polling: the
/// updater is started by an external scheduler and exits after one pass.
///
/// The address is returned as text. Change detection compares it by plain
/// string equality against the persisted record, so implementations should
/// return a canonical dotted quad.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current address, e.g. `"203.0.113.7"`
    /// - `Err(Error)`: If unable to determine the current IP
    async fn current(&self) -> Result<String, crate::Error>;

    /// Name of the source (for logging/debugging)
    fn source_name(&self) -> &'static str {
        "ip-source"
    }
}
