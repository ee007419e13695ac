// crates/warden-reputation/src/decision.rs
//
// Suspension and disqualification decisions for one audit outcome.
//
// Given a node's prior record, the audit outcome, and the refreshed online
// score, `decide` computes every field the update writes. Optional status
// timestamps are expressed as `FieldUpdate`s so that "leave as is" and
// "clear" stay distinct until the update is applied.
//
// Offline track state machine:
//
//   Clear --(score < threshold, full tracking period)--> UnderReview + Suspended
//   UnderReview: suspended iff currently penalized, re-evaluated every audit
//   UnderReview --(grace + tracking elapsed, recovered)--> Clear
//   UnderReview --(grace + tracking elapsed, still penalized, DQ enabled)--> Disqualified
//
// Disqualification is absorbing; every other transition can be undone by
// later audits.

use chrono::{DateTime, Utc};

use warden_core::config::ReputationConfig;
use warden_core::outcome::AuditOutcome;
use warden_core::record::ReputationRecord;

use crate::belief::Belief;
use crate::history::HistoryUpdate;
use crate::observer::{metrics, ReputationObserver};

/// Tri-state change to an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value as it is.
    Unchanged,
    /// Overwrite with a new value.
    Set(T),
    /// Overwrite with `None`.
    Cleared,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    /// True unless the update is `Unchanged`.
    pub fn is_set(&self) -> bool {
        !matches!(self, FieldUpdate::Unchanged)
    }

    /// Write the update into an optional field.
    pub fn apply(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Cleared => *field = None,
        }
    }
}

/// Every field written by one reputation update.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationUpdate {
    pub audit_alpha: f64,
    pub audit_beta: f64,
    pub unknown_audit_alpha: f64,
    pub unknown_audit_beta: f64,
    pub total_audit_count: u64,
    pub audit_success_count: u64,
    pub online_score: f64,
    pub contained: bool,
    pub vetted_at: FieldUpdate<DateTime<Utc>>,
    pub disqualified: FieldUpdate<DateTime<Utc>>,
    pub unknown_audit_suspended: FieldUpdate<DateTime<Utc>>,
    pub offline_suspended: FieldUpdate<DateTime<Utc>>,
    pub under_review: FieldUpdate<DateTime<Utc>>,
    pub last_contact_success: FieldUpdate<DateTime<Utc>>,
    pub last_contact_failure: FieldUpdate<DateTime<Utc>>,
}

impl ReputationUpdate {
    /// Write the update into a record.
    pub fn apply_to(self, record: &mut ReputationRecord) {
        record.audit_alpha = self.audit_alpha;
        record.audit_beta = self.audit_beta;
        record.unknown_audit_alpha = self.unknown_audit_alpha;
        record.unknown_audit_beta = self.unknown_audit_beta;
        record.total_audit_count = self.total_audit_count;
        record.audit_success_count = self.audit_success_count;
        record.online_score = self.online_score;
        record.contained = self.contained;
        self.vetted_at.apply(&mut record.vetted_at);
        self.disqualified.apply(&mut record.disqualified);
        self.unknown_audit_suspended
            .apply(&mut record.unknown_audit_suspended);
        self.offline_suspended.apply(&mut record.offline_suspended);
        self.under_review.apply(&mut record.under_review);
        self.last_contact_success
            .apply(&mut record.last_contact_success);
        self.last_contact_failure
            .apply(&mut record.last_contact_failure);
    }
}

/// Compute the update produced by one audit outcome.
///
/// `prior` must not be disqualified; the orchestrator filters those out
/// before calling. All comparisons against suspension timestamps use the
/// prior values, so a node suspended by this very call is never
/// disqualified by it as well.
pub fn decide(
    prior: &ReputationRecord,
    outcome: AuditOutcome,
    history: &HistoryUpdate,
    config: &ReputationConfig,
    now: DateTime<Utc>,
    observer: &dyn ReputationObserver,
) -> ReputationUpdate {
    let lambda = config.audit_lambda;
    let weight = config.audit_weight;
    let mut audit = Belief::new(prior.audit_alpha, prior.audit_beta);
    let mut unknown = Belief::new(prior.unknown_audit_alpha, prior.unknown_audit_beta);

    match outcome {
        AuditOutcome::Success => {
            // Success counts for both the normal and the unknown pair.
            audit = audit.update(true, lambda, weight);
            unknown = unknown.update(true, lambda, weight);
        }
        AuditOutcome::Failure => audit = audit.update(false, lambda, weight),
        AuditOutcome::Unknown => unknown = unknown.update(false, lambda, weight),
        AuditOutcome::Offline => {}
    }
    let total_audit_count = prior.total_audit_count + 1;

    observer.observe(metrics::AUDIT_ALPHA, audit.alpha);
    observer.observe(metrics::AUDIT_BETA, audit.beta);
    observer.observe(metrics::UNKNOWN_AUDIT_ALPHA, unknown.alpha);
    observer.observe(metrics::UNKNOWN_AUDIT_BETA, unknown.beta);
    observer.observe(metrics::ONLINE_SCORE, history.new_score);

    let node_id = prior.node_id;
    let mut update = ReputationUpdate {
        audit_alpha: audit.alpha,
        audit_beta: audit.beta,
        unknown_audit_alpha: unknown.alpha,
        unknown_audit_beta: unknown.beta,
        total_audit_count,
        audit_success_count: prior.audit_success_count,
        online_score: history.new_score,
        // Any processed update exits containment.
        contained: false,
        vetted_at: FieldUpdate::Unchanged,
        disqualified: FieldUpdate::Unchanged,
        unknown_audit_suspended: FieldUpdate::Unchanged,
        offline_suspended: FieldUpdate::Unchanged,
        under_review: FieldUpdate::Unchanged,
        last_contact_success: FieldUpdate::Unchanged,
        last_contact_failure: FieldUpdate::Unchanged,
    };

    if prior.vetted_at.is_none() && total_audit_count >= config.audits_required_for_vetting {
        tracing::info!(node_id = %node_id, total_audit_count, "Vetted");
        update.vetted_at = FieldUpdate::Set(now);
    }

    if audit.reputation() <= config.audit_dq {
        tracing::info!(node_id = %node_id, dq_type = "audit failure", "Disqualified");
        observer.mark(metrics::BAD_AUDIT_DQS);
        update.disqualified = FieldUpdate::Set(now);
    }

    if unknown.reputation() <= config.audit_dq {
        if prior.unknown_audit_suspended.is_none() {
            tracing::info!(node_id = %node_id, category = "unknown audits", "Suspended");
            update.unknown_audit_suspended = FieldUpdate::Set(now);
        }

        if outcome != AuditOutcome::Success && !update.unknown_audit_suspended.is_set() {
            if let Some(suspended_at) = prior.unknown_audit_suspended {
                if config.suspension_dq_enabled
                    && now.signed_duration_since(suspended_at) > config.suspension_grace_period()
                {
                    tracing::info!(
                        node_id = %node_id,
                        dq_type = "suspension grace period expired for unknown audits",
                        "Disqualified"
                    );
                    observer.mark(metrics::UNKNOWN_SUSPENSION_DQS);
                    update.disqualified = FieldUpdate::Set(now);
                    update.unknown_audit_suspended = FieldUpdate::Cleared;
                }
            }
        }
    } else if prior.unknown_audit_suspended.is_some() {
        tracing::info!(node_id = %node_id, category = "unknown audits", "Suspension lifted");
        update.unknown_audit_suspended = FieldUpdate::Cleared;
    }

    if outcome.is_online() {
        update.last_contact_success = FieldUpdate::Set(now);
    } else {
        update.last_contact_failure = FieldUpdate::Set(now);
    }

    if outcome == AuditOutcome::Success {
        update.audit_success_count += 1;
    }

    let history_config = &config.audit_history;
    if !history_config.offline_suspension_enabled {
        if prior.offline_suspended.is_some() {
            update.offline_suspended = FieldUpdate::Cleared;
        }
        if prior.under_review.is_some() {
            update.under_review = FieldUpdate::Cleared;
        }
        return update;
    }

    // Only penalize once a full tracking period of complete windows exists.
    let penalize =
        history.new_score < history_config.offline_threshold && history.tracking_period_full;

    match prior.under_review {
        Some(review_started) => {
            if !penalize && prior.offline_suspended.is_some() {
                update.offline_suspended = FieldUpdate::Cleared;
            } else if penalize && prior.offline_suspended.is_none() {
                update.offline_suspended = FieldUpdate::Set(now);
            }

            let grace_period_end = review_started + history_config.grace_period();
            let tracking_period_end = grace_period_end + history_config.tracking_period();
            if now > tracking_period_end {
                if penalize {
                    if history_config.offline_dq_enabled {
                        tracing::info!(node_id = %node_id, dq_type = "node offline", "Disqualified");
                        observer.mark(metrics::OFFLINE_DQS);
                        update.disqualified = FieldUpdate::Set(now);
                    }
                } else {
                    tracing::info!(node_id = %node_id, category = "offline", "Review passed");
                    update.under_review = FieldUpdate::Cleared;
                    update.offline_suspended = FieldUpdate::Cleared;
                }
            }
        }
        None if penalize => {
            tracing::info!(
                node_id = %node_id,
                category = "offline",
                online_score = history.new_score,
                "Suspended, under review"
            );
            update.under_review = FieldUpdate::Set(now);
            update.offline_suspended = FieldUpdate::Set(now);
        }
        None => {}
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};
    use warden_core::config::AuditHistoryConfig;
    use warden_core::identity::NodeId;

    use crate::observer::NoopObserver;

    #[derive(Default)]
    struct CountingObserver {
        marks: Mutex<Vec<&'static str>>,
    }

    impl ReputationObserver for CountingObserver {
        fn observe(&self, _name: &'static str, _value: f64) {}

        fn mark(&self, name: &'static str) {
            self.marks.lock().unwrap().push(name);
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn config() -> ReputationConfig {
        ReputationConfig {
            audit_lambda: 0.5,
            audit_weight: 1.0,
            audit_dq: 0.6,
            audits_required_for_vetting: 3,
            suspension_grace_period_secs: 3600,
            suspension_dq_enabled: true,
            initial_alpha: 4.0,
            initial_beta: 0.5,
            audit_history: AuditHistoryConfig {
                window_size_secs: 3600,
                tracking_period_secs: 4 * 3600,
                grace_period_secs: 3600,
                offline_threshold: 0.6,
                offline_dq_enabled: true,
                offline_suspension_enabled: true,
            },
        }
    }

    fn record() -> ReputationRecord {
        let cfg = config();
        ReputationRecord::new(NodeId::from_bytes([7; 32]), cfg.initial_alpha, cfg.initial_beta)
    }

    fn healthy() -> HistoryUpdate {
        HistoryUpdate {
            new_score: 1.0,
            tracking_period_full: true,
        }
    }

    fn offline_score(score: f64) -> HistoryUpdate {
        HistoryUpdate {
            new_score: score,
            tracking_period_full: true,
        }
    }

    fn run(rec: &ReputationRecord, outcome: AuditOutcome, history: HistoryUpdate) -> ReputationRecord {
        let mut next = rec.clone();
        decide(rec, outcome, &history, &config(), now(), &NoopObserver).apply_to(&mut next);
        next
    }

    #[test]
    fn field_update_apply() {
        let mut field = Some(1);
        FieldUpdate::Unchanged.apply(&mut field);
        assert_eq!(field, Some(1));
        FieldUpdate::Set(2).apply(&mut field);
        assert_eq!(field, Some(2));
        FieldUpdate::Cleared.apply(&mut field);
        assert_eq!(field, None);
    }

    #[test]
    fn success_updates_both_pairs() {
        let rec = record();
        let next = run(&rec, AuditOutcome::Success, healthy());
        assert!((next.audit_alpha - 3.0).abs() < 1e-12);
        assert!((next.audit_beta - 0.25).abs() < 1e-12);
        assert!((next.unknown_audit_alpha - 3.0).abs() < 1e-12);
        assert!((next.unknown_audit_beta - 0.25).abs() < 1e-12);
        assert_eq!(next.total_audit_count, 1);
        assert_eq!(next.audit_success_count, 1);
        assert_eq!(next.last_contact_success, Some(now()));
    }

    #[test]
    fn failure_updates_normal_pair_only() {
        let rec = record();
        let next = run(&rec, AuditOutcome::Failure, healthy());
        assert!((next.audit_beta - 1.25).abs() < 1e-12);
        assert_eq!(next.unknown_audit_alpha, rec.unknown_audit_alpha);
        assert_eq!(next.unknown_audit_beta, rec.unknown_audit_beta);
        assert_eq!(next.audit_success_count, 0);
        assert_eq!(next.total_audit_count, 1);
    }

    #[test]
    fn unknown_updates_unknown_pair_only() {
        let rec = record();
        let next = run(&rec, AuditOutcome::Unknown, healthy());
        assert_eq!(next.audit_alpha, rec.audit_alpha);
        assert!((next.unknown_audit_beta - 1.25).abs() < 1e-12);
    }

    #[test]
    fn offline_only_counts_and_marks_contact_failure() {
        let mut rec = record();
        rec.contained = true;
        let next = run(&rec, AuditOutcome::Offline, healthy());
        assert_eq!(next.audit_alpha, rec.audit_alpha);
        assert_eq!(next.unknown_audit_beta, rec.unknown_audit_beta);
        assert_eq!(next.total_audit_count, 1);
        assert_eq!(next.last_contact_failure, Some(now()));
        assert_eq!(next.last_contact_success, None);
        assert!(!next.contained);
    }

    #[test]
    fn vetting_sets_once_at_threshold() {
        let mut rec = record();
        rec.total_audit_count = 1;
        let next = run(&rec, AuditOutcome::Success, healthy());
        assert!(next.vetted_at.is_none());
        let next = run(&next, AuditOutcome::Success, healthy());
        assert_eq!(next.vetted_at, Some(now()));

        let earlier = now() - Duration::days(1);
        let mut vetted = next.clone();
        vetted.vetted_at = Some(earlier);
        let next = run(&vetted, AuditOutcome::Offline, healthy());
        assert_eq!(next.vetted_at, Some(earlier));
    }

    #[test]
    fn low_audit_reputation_disqualifies() {
        let observer = CountingObserver::default();
        let mut rec = record();
        rec.audit_alpha = 1.0;
        rec.audit_beta = 0.5;
        let update = decide(&rec, AuditOutcome::Failure, &healthy(), &config(), now(), &observer);
        assert_eq!(update.disqualified, FieldUpdate::Set(now()));
        assert_eq!(*observer.marks.lock().unwrap(), vec![metrics::BAD_AUDIT_DQS]);
    }

    #[test]
    fn newly_suspended_node_is_not_disqualified_in_same_call() {
        let mut cfg = config();
        cfg.suspension_grace_period_secs = 0;
        let mut rec = record();
        rec.unknown_audit_alpha = 1.0;
        rec.unknown_audit_beta = 0.625;
        let update = decide(&rec, AuditOutcome::Unknown, &healthy(), &cfg, now(), &NoopObserver);
        assert_eq!(update.unknown_audit_suspended, FieldUpdate::Set(now()));
        assert_eq!(update.disqualified, FieldUpdate::Unchanged);
    }

    #[test]
    fn expired_unknown_suspension_disqualifies_on_non_success() {
        let observer = CountingObserver::default();
        let mut rec = record();
        rec.unknown_audit_alpha = 1.0;
        rec.unknown_audit_beta = 1.625;
        rec.unknown_audit_suspended = Some(now() - Duration::hours(2));

        let update = decide(&rec, AuditOutcome::Failure, &healthy(), &config(), now(), &observer);
        assert_eq!(update.disqualified, FieldUpdate::Set(now()));
        assert_eq!(update.unknown_audit_suspended, FieldUpdate::Cleared);
        assert_eq!(
            *observer.marks.lock().unwrap(),
            vec![metrics::UNKNOWN_SUSPENSION_DQS]
        );
    }

    #[test]
    fn suspension_within_grace_period_does_not_disqualify() {
        let mut rec = record();
        rec.unknown_audit_alpha = 1.0;
        rec.unknown_audit_beta = 1.625;
        rec.unknown_audit_suspended = Some(now() - Duration::minutes(30));
        let next = run(&rec, AuditOutcome::Unknown, healthy());
        assert!(next.disqualified.is_none());
        assert_eq!(next.unknown_audit_suspended, rec.unknown_audit_suspended);
    }

    #[test]
    fn suspension_dq_disabled_keeps_node_suspended() {
        let mut cfg = config();
        cfg.suspension_dq_enabled = false;
        let mut rec = record();
        rec.unknown_audit_alpha = 1.0;
        rec.unknown_audit_beta = 1.625;
        rec.unknown_audit_suspended = Some(now() - Duration::days(30));
        let update = decide(&rec, AuditOutcome::Unknown, &healthy(), &cfg, now(), &NoopObserver);
        assert_eq!(update.disqualified, FieldUpdate::Unchanged);
        assert_eq!(update.unknown_audit_suspended, FieldUpdate::Unchanged);
    }

    #[test]
    fn success_past_grace_period_keeps_suspension_without_disqualifying() {
        let mut rec = record();
        rec.unknown_audit_alpha = 0.1;
        rec.unknown_audit_beta = 10.0;
        rec.unknown_audit_suspended = Some(now() - Duration::days(3));

        let update = decide(&rec, AuditOutcome::Success, &healthy(), &config(), now(), &NoopObserver);
        // 1.05 / 6.05 stays below the 0.6 threshold.
        assert!(update.unknown_audit_alpha / (update.unknown_audit_alpha + update.unknown_audit_beta) < 0.6);
        assert_eq!(update.disqualified, FieldUpdate::Unchanged);
        assert_eq!(update.unknown_audit_suspended, FieldUpdate::Unchanged);
    }

    #[test]
    fn recovered_unknown_reputation_lifts_suspension() {
        let mut rec = record();
        rec.unknown_audit_alpha = 1.0;
        rec.unknown_audit_beta = 0.3;
        rec.unknown_audit_suspended = Some(now() - Duration::days(3));
        let next = run(&rec, AuditOutcome::Success, healthy());
        assert!(next.unknown_audit_suspended.is_none());
        assert!(next.disqualified.is_none());
    }

    #[test]
    fn offline_tracking_disabled_clears_offline_state() {
        let mut cfg = config();
        cfg.audit_history.offline_suspension_enabled = false;
        let mut rec = record();
        rec.offline_suspended = Some(now() - Duration::hours(1));
        rec.under_review = Some(now() - Duration::hours(1));
        let update = decide(&rec, AuditOutcome::Offline, &offline_score(0.0), &cfg, now(), &NoopObserver);
        assert_eq!(update.offline_suspended, FieldUpdate::Cleared);
        assert_eq!(update.under_review, FieldUpdate::Cleared);
        assert_eq!(update.disqualified, FieldUpdate::Unchanged);
    }

    #[test]
    fn penalized_node_enters_review() {
        let next = run(&record(), AuditOutcome::Offline, offline_score(0.3));
        assert_eq!(next.under_review, Some(now()));
        assert_eq!(next.offline_suspended, Some(now()));
    }

    #[test]
    fn low_score_without_full_tracking_period_is_not_penalized() {
        let history = HistoryUpdate {
            new_score: 0.1,
            tracking_period_full: false,
        };
        let next = run(&record(), AuditOutcome::Offline, history);
        assert!(next.under_review.is_none());
        assert!(next.offline_suspended.is_none());
    }

    #[test]
    fn suspension_toggles_during_review() {
        let mut rec = record();
        rec.under_review = Some(now() - Duration::hours(1));
        rec.offline_suspended = Some(now() - Duration::hours(1));

        let next = run(&rec, AuditOutcome::Success, offline_score(0.9));
        assert!(next.offline_suspended.is_none());
        assert_eq!(next.under_review, rec.under_review);

        let next = run(&next, AuditOutcome::Offline, offline_score(0.2));
        assert_eq!(next.offline_suspended, Some(now()));
        assert_eq!(next.under_review, rec.under_review);
    }

    #[test]
    fn review_passes_after_grace_and_tracking_when_recovered() {
        let mut rec = record();
        rec.under_review = Some(now() - Duration::hours(6));
        rec.offline_suspended = Some(now() - Duration::hours(6));
        let next = run(&rec, AuditOutcome::Success, offline_score(0.8));
        assert!(next.under_review.is_none());
        assert!(next.offline_suspended.is_none());
        assert!(next.disqualified.is_none());
    }

    #[test]
    fn review_fails_after_grace_and_tracking_when_still_offline() {
        let observer = CountingObserver::default();
        let mut rec = record();
        rec.under_review = Some(now() - Duration::hours(6));
        rec.offline_suspended = Some(now() - Duration::hours(6));
        let update = decide(&rec, AuditOutcome::Offline, &offline_score(0.3), &config(), now(), &observer);
        assert_eq!(update.disqualified, FieldUpdate::Set(now()));
        assert_eq!(*observer.marks.lock().unwrap(), vec![metrics::OFFLINE_DQS]);
    }

    #[test]
    fn review_fails_without_dq_when_flag_disabled() {
        let mut cfg = config();
        cfg.audit_history.offline_dq_enabled = false;
        let mut rec = record();
        rec.under_review = Some(now() - Duration::hours(6));
        rec.offline_suspended = Some(now() - Duration::hours(6));
        let update = decide(&rec, AuditOutcome::Offline, &offline_score(0.3), &cfg, now(), &NoopObserver);
        assert_eq!(update.disqualified, FieldUpdate::Unchanged);
        assert_eq!(update.under_review, FieldUpdate::Unchanged);
        assert_eq!(update.offline_suspended, FieldUpdate::Unchanged);
    }

    #[test]
    fn review_end_is_exclusive() {
        let mut rec = record();
        // grace (1h) + tracking (4h) ends exactly now.
        rec.under_review = Some(now() - Duration::hours(5));
        rec.offline_suspended = Some(now() - Duration::hours(5));
        let next = run(&rec, AuditOutcome::Offline, offline_score(0.3));
        assert!(next.disqualified.is_none());
        assert_eq!(next.under_review, rec.under_review);
    }
}
