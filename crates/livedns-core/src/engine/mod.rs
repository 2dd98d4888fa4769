//! Reconciliation engine
//!
//! The engine is responsible for:
//! - Computing the delete-then-create plan for a zone snapshot
//! - Driving the DnsProvider through that plan, one host at a time
//! - Classifying each host's outcome
//!
//! ## Architecture
//!
//! ```text
//!  zone snapshot ──┐
//!  required hosts ─┼──► reconcile() ──► ReconciliationPlan
//!  current IP ─────┘                           │
//!                                              ▼
//!                                 ┌──────────────────────┐
//!                                 │ ReconciliationEngine │
//!                                 │       apply()        │
//!                                 └──────────────────────┘
//!                                              │  per host, in order
//!                                              ▼
//!                                 ┌──────────────────────┐
//!                                 │     DnsProvider      │
//!                                 │ delete ×N, create ×1 │
//!                                 └──────────────────────┘
//! ```
//!
//! ## Failure isolation
//!
//! Hosts are independent. A fault on one host is recorded in its
//! [`HostResult`] and the next host is attempted anyway. Nothing is retried
//! within a run; a host that failed to converge is picked up again by the
//! next invocation.

pub mod change;
pub mod plan;

pub use change::has_changed;
pub use plan::{HostOperation, ReconciliationPlan, reconcile};

use crate::config::RunConfig;
use crate::error::Result;
use crate::hostname::display_host;
use crate::traits::{CreateOutcome, DeleteOutcome, DnsProvider, ZoneRecord};
use tracing::{debug, error, info, warn};

/// How a single host ended up after its delete/create pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    /// At least one existing record was removed, then the new one created
    RemovedAndCreated,

    /// Delete reported "does not exist", then the new record was created
    NotPresentThenCreated,

    /// Delete succeeded or was a no-op, but the create was not acknowledged
    CreateFailed {
        /// Provider's reply
        reason: String,
    },

    /// A delete or create call raised a transport/provider fault
    OperationError {
        /// Error description
        error: String,
    },
}

impl HostOutcome {
    /// Whether the host converged on the current IP
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            HostOutcome::RemovedAndCreated | HostOutcome::NotPresentThenCreated
        )
    }
}

/// Per-host result of applying a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    /// Short host label
    pub host: String,
    /// Outcome
    pub outcome: HostOutcome,
}

impl HostResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Applies reconciliation plans against a provider
///
/// Borrowing both the provider and the run configuration keeps the engine
/// free of any state of its own; one is built per run.
pub struct ReconciliationEngine<'a> {
    /// DNS provider for zone operations
    provider: &'a dyn DnsProvider,

    /// Credentials, domain, required hosts and default TTL
    config: &'a RunConfig,
}

impl<'a> ReconciliationEngine<'a> {
    /// Create an engine for one run
    pub fn new(provider: &'a dyn DnsProvider, config: &'a RunConfig) -> Self {
        Self { provider, config }
    }

    /// Read the zone through the provider
    pub async fn snapshot(&self) -> Result<Vec<ZoneRecord>> {
        let records = self
            .provider
            .list_zone_records(&self.config.credentials)
            .await?;
        debug!(
            "Zone {} holds {} record(s)",
            self.config.domain(),
            records.len()
        );
        Ok(records)
    }

    /// Compute the plan for `current_ip` from a zone snapshot
    pub fn reconcile(&self, current_ip: &str, snapshot: &[ZoneRecord]) -> ReconciliationPlan {
        reconcile(
            current_ip,
            snapshot,
            &self.config.required_hosts,
            self.config.domain(),
            self.config.default_ttl,
        )
    }

    /// Apply a plan sequentially, host by host
    ///
    /// Never fails as a whole: every provider fault is folded into the
    /// corresponding host's [`HostOutcome`].
    pub async fn apply(&self, plan: &ReconciliationPlan) -> Vec<HostResult> {
        let mut results = Vec::with_capacity(plan.operations.len());

        for op in &plan.operations {
            let outcome = self.apply_host(op, &plan.current_ip).await;
            let name = display_host(&op.host, self.config.domain());

            match &outcome {
                HostOutcome::RemovedAndCreated | HostOutcome::NotPresentThenCreated => {
                    info!("Record {} now points at {}", name, plan.current_ip);
                }
                HostOutcome::CreateFailed { reason } => {
                    error!("Record {} was *not* created: {}", name, reason);
                }
                HostOutcome::OperationError { error } => {
                    error!("Failed to update record {}: {}", name, error);
                }
            }

            results.push(HostResult {
                host: op.host.clone(),
                outcome,
            });
        }

        results
    }

    /// Delete every existing A record for the host, then create one
    async fn apply_host(&self, op: &HostOperation, current_ip: &str) -> HostOutcome {
        let credentials = &self.config.credentials;
        let name = display_host(&op.host, self.config.domain());

        let mut removed_any = false;
        for attempt in 0..op.deletes {
            match self.provider.delete_a_record(credentials, &op.host).await {
                Ok(DeleteOutcome::Removed) => {
                    info!("Record {} was successfully removed", name);
                    removed_any = true;
                }
                Ok(DeleteOutcome::NotFound { reason }) => {
                    warn!(
                        "Record {} could not be removed since it doesn't exist ({})",
                        name, reason
                    );
                }
                Err(e) => {
                    warn!(
                        "Delete attempt {} of {} failed for {}: {}",
                        attempt + 1,
                        op.deletes,
                        name,
                        e
                    );
                    return HostOutcome::OperationError {
                        error: e.to_string(),
                    };
                }
            }
        }

        match self
            .provider
            .create_a_record(credentials, &op.host, current_ip, op.ttl)
            .await
        {
            Ok(CreateOutcome::Created) if removed_any => HostOutcome::RemovedAndCreated,
            Ok(CreateOutcome::Created) => HostOutcome::NotPresentThenCreated,
            Ok(CreateOutcome::Rejected { reason }) => HostOutcome::CreateFailed { reason },
            Err(e) => HostOutcome::OperationError {
                error: e.to_string(),
            },
        }
    }
}
