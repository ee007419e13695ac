// crates/warden-reputation/src/service.rs
//
// ReputationService: transactional entry point for reputation updates.
//
// Each operation on a node runs its whole read-modify-write while holding
// that node's shard lock from `NodeLockTable`, so concurrent updates for the
// same node are linearized and none is lost. The record is loaded (or
// created with the configured neutral prior), modified in memory, and saved
// with a single store write only if every step succeeded; a failed step
// leaves the stored record untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use warden_core::config::ReputationConfig;
use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::outcome::{AuditEvent, AuditOutcome};
use warden_core::record::{AuditHistory, NodeReputation};
use warden_core::status::ReputationStatus;
use warden_core::traits::ReputationStore;

use crate::decision::decide;
use crate::history::{record_observation, HistoryUpdate};
use crate::locks::NodeLockTable;
use crate::observer::{NoopObserver, ReputationObserver};

/// Outcome of the get-or-create step of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedReputation {
    /// The node already had a stored reputation.
    Existing(NodeReputation),
    /// No reputation was stored; a neutral one was created in memory.
    Created(NodeReputation),
}

impl LoadedReputation {
    pub fn is_created(&self) -> bool {
        matches!(self, LoadedReputation::Created(_))
    }

    pub fn into_inner(self) -> NodeReputation {
        match self {
            LoadedReputation::Existing(rep) | LoadedReputation::Created(rep) => rep,
        }
    }
}

/// Orchestrates audit-driven reputation updates over a `ReputationStore`.
pub struct ReputationService<S> {
    store: Arc<S>,
    locks: NodeLockTable,
    observer: Arc<dyn ReputationObserver>,
}

impl<S: ReputationStore> ReputationService<S> {
    /// Create a service over the given store with a no-op observer.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: NodeLockTable::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report belief parameters, scores, and DQ counters to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ReputationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use `num_shards` per-node lock shards instead of the default.
    pub fn with_lock_shards(mut self, num_shards: usize) -> Self {
        self.locks = NodeLockTable::new(num_shards);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load a node's reputation, or create a neutral one if none is stored.
    ///
    /// Must be called with the node's lock held. A created reputation is
    /// only persisted when the caller saves it.
    async fn load_or_create(
        &self,
        node_id: &NodeId,
        config: &ReputationConfig,
    ) -> Result<LoadedReputation, WardenError> {
        match self.store.load(node_id).await? {
            Some(rep) => Ok(LoadedReputation::Existing(rep)),
            None => {
                tracing::debug!(node_id = %node_id, "Creating reputation record");
                Ok(LoadedReputation::Created(NodeReputation::new(*node_id, config)))
            }
        }
    }

    async fn load_existing(&self, node_id: &NodeId) -> Result<NodeReputation, WardenError> {
        self.store
            .load(node_id)
            .await?
            .ok_or_else(|| WardenError::NotFound(format!("no reputation for node {}", node_id)))
    }

    /// Apply one audit outcome to a node.
    ///
    /// Returns the node's status after the update and whether any externally
    /// visible status field changed. Disqualified nodes are left untouched
    /// and reported with `changed = false`. Fails with `StaleObservation`
    /// when `observed_at` falls in a window older than the node's latest one,
    /// and with `InvalidConfig` before touching the store when `config` is
    /// out of range.
    pub async fn apply_audit(
        &self,
        node_id: &NodeId,
        outcome: AuditOutcome,
        observed_at: DateTime<Utc>,
        config: &ReputationConfig,
    ) -> Result<(ReputationStatus, bool), WardenError> {
        config.validate()?;
        let _guard = self.locks.lock(node_id).await;

        let prior = self.load_or_create(node_id, config).await?.into_inner();

        if prior.record.is_disqualified() {
            tracing::debug!(node_id = %node_id, %outcome, "Ignoring audit for disqualified node");
            return Ok((prior.record.status(), false));
        }

        let mut next = prior.clone();
        let history_update = match record_observation(
            &mut next.history,
            observed_at,
            outcome.is_online(),
            &config.audit_history,
        ) {
            Ok(update) => update,
            Err(e) => {
                if let WardenError::StaleObservation { .. } = e {
                    tracing::warn!(node_id = %node_id, %outcome, %observed_at, "Rejected stale audit");
                }
                return Err(e);
            }
        };

        decide(
            &prior.record,
            outcome,
            &history_update,
            config,
            observed_at,
            self.observer.as_ref(),
        )
        .apply_to(&mut next.record);

        self.store.save(&next).await?;

        let old_status = prior.record.status();
        let new_status = next.record.status();
        let changed = old_status != new_status;
        Ok((new_status, changed))
    }

    /// Apply an audit event as produced by an auditor.
    pub async fn apply_event(
        &self,
        event: &AuditEvent,
        config: &ReputationConfig,
    ) -> Result<(ReputationStatus, bool), WardenError> {
        self.apply_audit(&event.node_id, event.outcome, event.observed_at, config)
            .await
    }

    /// Record one online/offline observation without touching belief
    /// parameters or status fields.
    pub async fn update_audit_history(
        &self,
        node_id: &NodeId,
        observed_at: DateTime<Utc>,
        online: bool,
        config: &ReputationConfig,
    ) -> Result<HistoryUpdate, WardenError> {
        config.validate()?;
        let _guard = self.locks.lock(node_id).await;

        let mut rep = self.load_or_create(node_id, config).await?.into_inner();
        if rep.record.is_disqualified() {
            return Ok(HistoryUpdate {
                new_score: rep.history.score,
                tracking_period_full: rep.history.windows.len().saturating_sub(1)
                    >= config.audit_history.windows_per_tracking_period(),
            });
        }

        let update = record_observation(&mut rep.history, observed_at, online, &config.audit_history)?;
        self.store.save(&rep).await?;
        Ok(update)
    }

    /// Overwrite a node's status fields, bypassing the belief update.
    ///
    /// Intended for administrative overrides and reconciliation. Unlike the
    /// audit path this also writes to disqualified nodes.
    pub async fn set_status(
        &self,
        node_id: &NodeId,
        status: &ReputationStatus,
    ) -> Result<(), WardenError> {
        let _guard = self.locks.lock(node_id).await;

        let mut rep = self.load_existing(node_id).await?;
        rep.record.apply_status(status);
        self.store.save(&rep).await?;
        tracing::info!(node_id = %node_id, ?status, "Status overridden");
        Ok(())
    }

    /// Disqualify a node immediately, creating its record if needed.
    ///
    /// Disqualifying an already disqualified node keeps the first disqualification time.
    pub async fn disqualify_node(
        &self,
        node_id: &NodeId,
        now: DateTime<Utc>,
        config: &ReputationConfig,
    ) -> Result<ReputationStatus, WardenError> {
        config.validate()?;
        let _guard = self.locks.lock(node_id).await;

        let mut rep = self.load_or_create(node_id, config).await?.into_inner();
        if rep.record.is_disqualified() {
            return Ok(rep.record.status());
        }
        rep.record.disqualified = Some(now);
        self.store.save(&rep).await?;
        tracing::info!(node_id = %node_id, dq_type = "administrative", "Disqualified");
        Ok(rep.record.status())
    }

    /// Suspend a node for unknown audits, creating its record if needed.
    pub async fn suspend_unknown_audit(
        &self,
        node_id: &NodeId,
        suspended_at: DateTime<Utc>,
        config: &ReputationConfig,
    ) -> Result<ReputationStatus, WardenError> {
        config.validate()?;
        let _guard = self.locks.lock(node_id).await;

        let mut rep = self.load_or_create(node_id, config).await?.into_inner();
        if !rep.record.is_disqualified() {
            rep.record.unknown_audit_suspended = Some(suspended_at);
            tracing::info!(node_id = %node_id, category = "unknown audits", "Suspended");
        }
        self.store.save(&rep).await?;
        Ok(rep.record.status())
    }

    /// Lift a node's unknown-audit suspension, creating its record if needed.
    pub async fn unsuspend_unknown_audit(
        &self,
        node_id: &NodeId,
        config: &ReputationConfig,
    ) -> Result<ReputationStatus, WardenError> {
        config.validate()?;
        let _guard = self.locks.lock(node_id).await;

        let mut rep = self.load_or_create(node_id, config).await?.into_inner();
        if !rep.record.is_disqualified() {
            rep.record.unknown_audit_suspended = None;
            tracing::info!(node_id = %node_id, category = "unknown audits", "Suspension lifted");
        }
        self.store.save(&rep).await?;
        Ok(rep.record.status())
    }

    /// Status fields of a node.
    pub async fn get_status(&self, node_id: &NodeId) -> Result<ReputationStatus, WardenError> {
        Ok(self.load_existing(node_id).await?.record.status())
    }

    /// Audit history of a node.
    pub async fn get_audit_history(&self, node_id: &NodeId) -> Result<AuditHistory, WardenError> {
        Ok(self.load_existing(node_id).await?.history)
    }

    /// Full reputation of a node: counters, belief parameters, and history.
    pub async fn get(&self, node_id: &NodeId) -> Result<NodeReputation, WardenError> {
        self.load_existing(node_id).await
    }

    /// Ids of every node with a stored reputation.
    pub async fn list_nodes(&self) -> Result<Vec<NodeId>, WardenError> {
        self.store.list_nodes().await
    }
}
