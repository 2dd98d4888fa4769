//! Run controller
//!
//! One invocation, one pass:
//!
//! 1. Ask the IP source for the current public address
//! 2. Load the last applied record from the state store
//! 3. If unchanged, stop; the zone and the state file are left alone
//! 4. Otherwise read the zone, plan, apply host by host
//! 5. Persist the new address only if every host converged and the
//!    provider actually changed the zone (not in dry-run)
//!
//! Steps run strictly in sequence. Persisting depends on the reconciliation
//! having finished, and a partial reconciliation never advances the stored
//! address, so the next run retries the hosts that failed.

use crate::config::RunConfig;
use crate::engine::{HostResult, ReconciliationEngine, has_changed};
use crate::error::Result;
use crate::hostname::display_host;
use crate::traits::{DnsProvider, IpRecord, IpSource, StateStore};
use tracing::{error, info, warn};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// The observed IP equals the stored one; nothing was touched
    Unchanged {
        /// The current (and stored) address
        ip: String,
    },

    /// The zone was reconciled against a new address
    Reconciled {
        /// Record loaded at the start of the run (possibly the sentinel)
        previous: IpRecord,
        /// Newly observed address
        current_ip: String,
        /// Per-host results, in execution order
        results: Vec<HostResult>,
        /// Whether the new address was written to the state store
        persisted: bool,
    },
}

impl RunReport {
    /// Hosts that did not converge
    pub fn failed_hosts(&self) -> Vec<&HostResult> {
        match self {
            RunReport::Unchanged { .. } => Vec::new(),
            RunReport::Reconciled { results, .. } => {
                results.iter().filter(|r| !r.is_success()).collect()
            }
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, RunReport::Unchanged { .. })
    }
}

/// Ties the IP source, provider, state store and engine together
///
/// ## Lifecycle
///
/// 1. Create with [`Updater::new()`]
/// 2. Call [`Updater::run_once()`]
/// 3. Drop; the process exits and the scheduler starts the next run
pub struct Updater {
    /// Public IP source
    ip_source: Box<dyn IpSource>,

    /// DNS provider for the managed zone
    provider: Box<dyn DnsProvider>,

    /// Last applied IP
    state_store: Box<dyn StateStore>,

    /// Immutable run configuration
    config: RunConfig,
}

impl Updater {
    /// Create a new updater
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if the configuration is invalid
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: RunConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            state_store,
            config,
        })
    }

    /// The run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Perform one pass
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: The run completed, including runs where some hosts
    ///   failed (see [`RunReport::failed_hosts`])
    /// - `Err(Error)`: The current IP or the zone could not be read; nothing
    ///   was changed and the state store was not touched
    pub async fn run_once(&self) -> Result<RunReport> {
        let current_ip = self.ip_source.current().await?;
        let previous = self.state_store.load().await;

        if !has_changed(&current_ip, &previous) {
            info!("IP did not change ({})", current_ip);
            return Ok(RunReport::Unchanged { ip: current_ip });
        }

        info!(
            "IP changed (previous: {} @ {}, current: {})",
            previous.ip,
            previous.update_time.to_rfc3339(),
            current_ip
        );

        let engine = ReconciliationEngine::new(self.provider.as_ref(), &self.config);
        let snapshot = engine.snapshot().await?;
        let plan = engine.reconcile(&current_ip, &snapshot);
        info!(
            "Reconciling {} host(s) in {} via {}",
            plan.len(),
            self.config.domain(),
            self.provider.provider_name()
        );

        let results = engine.apply(&plan).await;

        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| display_host(&r.host, self.config.domain()))
            .collect();

        let persisted = if self.provider.is_dry_run() {
            info!("Dry run: zone left unchanged, keeping previous IP state");
            false
        } else if failed.is_empty() {
            let saved = self.state_store.save(&current_ip).await;
            if !saved {
                warn!("Failed to store IP state; the next run will reconcile again");
            }
            saved
        } else {
            error!(
                "{} host(s) did not converge ({}); keeping previous IP state so the next run retries",
                failed.len(),
                failed.join(", ")
            );
            false
        };

        Ok(RunReport::Reconciled {
            previous,
            current_ip,
            results,
            persisted,
        })
    }
}
