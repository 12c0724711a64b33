//! Case Queue Implementation

use crate::QueueError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use severity_classifier::{Idiom, Language, SeverityTier};
use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Lowest tier that reaches a health worker (default: medium)
    pub escalation_threshold: SeverityTier,
    /// Cases retained before eviction
    pub max_cases: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: SeverityTier::Medium,
            max_cases: 500,
        }
    }
}

/// Suggested health-worker action for a tier
pub fn recommendation(severity: SeverityTier) -> &'static str {
    match severity {
        SeverityTier::Critical => "Immediate intervention needed",
        SeverityTier::High => "Schedule counseling within 24 hours",
        SeverityTier::Medium => "Schedule follow-up within 48 hours",
        SeverityTier::Low => "Share self-help resources",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    Acknowledged,
}

/// A triaged message submitted for escalation
#[derive(Debug, Clone)]
pub struct NewCase {
    pub session_id: Uuid,
    pub patient: Option<String>,
    pub message: String,
    pub language: Language,
    pub idioms: Vec<Idiom>,
    pub severity: SeverityTier,
}

/// A case waiting for (or seen by) a health worker
#[derive(Debug, Clone, Serialize)]
pub struct Case {
    pub id: Uuid,
    pub session_id: Uuid,
    pub patient: String,
    pub message: String,
    pub language: Language,
    pub idioms: Vec<Idiom>,
    pub severity: SeverityTier,
    pub recommendation: &'static str,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    seq: u64,
}

/// Which cases `list` returns
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFilter {
    pub severity: Option<SeverityTier>,
    pub status: Option<CaseStatus>,
    pub limit: Option<usize>,
}

/// Pending cases per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

struct QueueInner {
    cases: Vec<Case>,
    next_seq: u64,
}

/// Health-worker triage queue
pub struct CaseQueue {
    config: QueueConfig,
    inner: Mutex<QueueInner>,
}

impl CaseQueue {
    /// Create an empty queue
    pub fn new(config: QueueConfig) -> Self {
        info!("Creating case queue with config: {:?}", config);
        Self {
            config,
            inner: Mutex::new(QueueInner {
                cases: Vec::new(),
                next_seq: 0,
            }),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueInner>, QueueError> {
        self.inner.lock().map_err(|_| QueueError::LockPoisoned)
    }

    /// Escalate a triaged message
    ///
    /// Returns the queued case, or `None` when the tier is below the
    /// escalation threshold or the conversation already has a pending case
    /// at least as severe, or when a full queue holds only more urgent cases.
    /// A more severe message replaces the conversation's pending case.
    pub fn submit(&self, new_case: NewCase) -> Result<Option<Case>, QueueError> {
        if new_case.severity < self.config.escalation_threshold {
            debug!(
                "Case not escalated: {} below threshold {}",
                new_case.severity, self.config.escalation_threshold
            );
            return Ok(None);
        }

        let mut inner = self.lock()?;

        let pending = inner.cases.iter().position(|c| {
            c.session_id == new_case.session_id && c.status == CaseStatus::Pending
        });
        if let Some(index) = pending {
            let existing = inner.cases[index].severity;
            if existing >= new_case.severity {
                debug!(
                    "Case suppressed: session {} already pending at {}",
                    new_case.session_id, existing
                );
                return Ok(None);
            }
            inner.cases.remove(index);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let case = Case {
            id: Uuid::new_v4(),
            session_id: new_case.session_id,
            patient: new_case
                .patient
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            message: new_case.message,
            language: new_case.language,
            idioms: new_case.idioms,
            severity: new_case.severity,
            recommendation: recommendation(new_case.severity),
            status: CaseStatus::Pending,
            created_at: Utc::now(),
            seq,
        };

        if case.severity.requires_emergency() {
            warn!("Critical case queued: {} (session {})", case.id, case.session_id);
        } else {
            info!("Case queued: {} ({})", case.id, case.severity);
        }

        let id = case.id;
        inner.cases.push(case.clone());
        self.enforce_retention(&mut inner);

        if !inner.cases.iter().any(|c| c.id == id) {
            warn!("Queue full: case {} ({}) not retained", id, case.severity);
            return Ok(None);
        }
        Ok(Some(case))
    }

    /// Drop cases until the queue fits `max_cases`
    ///
    /// Acknowledged cases go first, oldest first. Pending cases go least
    /// urgent first, oldest within a tier, so a pending critical case is only
    /// dropped when every retained case is a pending critical case.
    fn enforce_retention(&self, inner: &mut QueueInner) {
        while inner.cases.len() > self.config.max_cases {
            // cases are kept in insertion order
            let acknowledged = inner
                .cases
                .iter()
                .position(|c| c.status == CaseStatus::Acknowledged);
            let victim = acknowledged.or_else(|| {
                inner
                    .cases
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, c)| (c.severity, c.seq))
                    .map(|(index, _)| index)
            });
            let Some(victim) = victim else { break };

            let evicted = inner.cases.remove(victim);
            if evicted.status == CaseStatus::Pending {
                warn!(
                    "Evicted pending case {} ({}) to stay within {} cases",
                    evicted.id, evicted.severity, self.config.max_cases
                );
            } else {
                debug!("Evicted case {} ({:?})", evicted.id, evicted.status);
            }
        }
    }

    /// Cases matching `filter`, most urgent first, newest first within a tier
    pub fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, QueueError> {
        let inner = self.lock()?;

        let mut cases: Vec<Case> = inner
            .cases
            .iter()
            .filter(|c| filter.severity.map_or(true, |s| c.severity == s))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();

        cases.sort_by_key(|c| (c.severity.urgency_rank(), Reverse(c.seq)));
        if let Some(limit) = filter.limit {
            cases.truncate(limit);
        }
        Ok(cases)
    }

    /// Look up one case
    pub fn get(&self, id: Uuid) -> Result<Case, QueueError> {
        let inner = self.lock()?;
        inner
            .cases
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(QueueError::NotFound(id))
    }

    /// Mark a case as seen by a health worker
    pub fn acknowledge(&self, id: Uuid) -> Result<Case, QueueError> {
        let mut inner = self.lock()?;
        let case = inner
            .cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(QueueError::NotFound(id))?;

        case.status = CaseStatus::Acknowledged;
        info!("Case acknowledged: {}", id);
        Ok(case.clone())
    }

    /// Pending cases per tier
    pub fn pending_counts(&self) -> Result<TierCounts, QueueError> {
        let inner = self.lock()?;
        let mut counts = TierCounts::default();

        for case in inner.cases.iter().filter(|c| c.status == CaseStatus::Pending) {
            match case.severity {
                SeverityTier::Critical => counts.critical += 1,
                SeverityTier::High => counts.high += 1,
                SeverityTier::Medium => counts.medium += 1,
                SeverityTier::Low => counts.low += 1,
            }
        }

        Ok(counts)
    }

    /// Total cases held
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.lock()?.cases.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }
}

impl Default for CaseQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_case(session_id: Uuid, severity: SeverityTier) -> NewCase {
        NewCase {
            session_id,
            patient: None,
            message: format!("{} message", severity),
            language: Language::English,
            idioms: Vec::new(),
            severity,
        }
    }

    #[test]
    fn test_threshold() {
        let queue = CaseQueue::default();

        let low = queue.submit(new_case(Uuid::new_v4(), SeverityTier::Low)).unwrap();
        assert!(low.is_none());

        let medium = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Medium))
            .unwrap()
            .unwrap();
        assert_eq!(medium.recommendation, "Schedule follow-up within 48 hours");
        assert_eq!(medium.patient, "Anonymous");
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn test_deduplication_per_session() {
        let queue = CaseQueue::default();
        let session = Uuid::new_v4();

        let first = queue.submit(new_case(session, SeverityTier::High)).unwrap();
        assert!(first.is_some());

        // same or lower tier is suppressed
        assert!(queue.submit(new_case(session, SeverityTier::High)).unwrap().is_none());
        assert!(queue.submit(new_case(session, SeverityTier::Medium)).unwrap().is_none());

        // escalation replaces the pending case
        let critical = queue
            .submit(new_case(session, SeverityTier::Critical))
            .unwrap()
            .unwrap();
        assert_eq!(queue.len().unwrap(), 1);
        assert_eq!(critical.recommendation, "Immediate intervention needed");
    }

    #[test]
    fn test_acknowledged_case_allows_new_escalation() {
        let queue = CaseQueue::default();
        let session = Uuid::new_v4();

        let case = queue.submit(new_case(session, SeverityTier::High)).unwrap().unwrap();
        let acked = queue.acknowledge(case.id).unwrap();
        assert_eq!(acked.status, CaseStatus::Acknowledged);

        assert!(queue.submit(new_case(session, SeverityTier::Medium)).unwrap().is_some());
        assert_eq!(queue.len().unwrap(), 2);
    }

    #[test]
    fn test_list_orders_by_urgency() {
        let queue = CaseQueue::default();
        for severity in [
            SeverityTier::Medium,
            SeverityTier::Critical,
            SeverityTier::High,
            SeverityTier::Medium,
        ] {
            queue.submit(new_case(Uuid::new_v4(), severity)).unwrap();
        }

        let cases = queue.list(&CaseFilter::default()).unwrap();
        let tiers: Vec<_> = cases.iter().map(|c| c.severity).collect();
        assert_eq!(
            tiers,
            vec![
                SeverityTier::Critical,
                SeverityTier::High,
                SeverityTier::Medium,
                SeverityTier::Medium,
            ]
        );
        // newest first within a tier
        assert!(cases[2].seq > cases[3].seq);
    }

    #[test]
    fn test_list_filters() {
        let queue = CaseQueue::default();
        let high = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::High))
            .unwrap()
            .unwrap();
        queue.submit(new_case(Uuid::new_v4(), SeverityTier::High)).unwrap();
        queue.submit(new_case(Uuid::new_v4(), SeverityTier::Medium)).unwrap();
        queue.acknowledge(high.id).unwrap();

        let filter = CaseFilter {
            severity: Some(SeverityTier::High),
            status: Some(CaseStatus::Pending),
            limit: None,
        };
        assert_eq!(queue.list(&filter).unwrap().len(), 1);

        let limited = CaseFilter {
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(queue.list(&limited).unwrap().len(), 2);

        let counts = queue.pending_counts().unwrap();
        assert_eq!(counts, TierCounts { critical: 0, high: 1, medium: 1, low: 0 });
    }

    #[test]
    fn test_unknown_case() {
        let queue = CaseQueue::default();
        let id = Uuid::new_v4();
        assert_eq!(queue.acknowledge(id).unwrap_err(), QueueError::NotFound(id));
        assert!(queue.get(id).is_err());
    }

    #[test]
    fn test_retention_prefers_acknowledged() {
        let queue = CaseQueue::new(QueueConfig {
            max_cases: 2,
            ..Default::default()
        });
        let first = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::High))
            .unwrap()
            .unwrap();
        let second = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::High))
            .unwrap()
            .unwrap();
        queue.acknowledge(second.id).unwrap();
        queue.submit(new_case(Uuid::new_v4(), SeverityTier::Medium)).unwrap();

        assert_eq!(queue.len().unwrap(), 2);
        assert!(queue.get(first.id).is_ok());
        assert!(queue.get(second.id).is_err());
    }

    #[test]
    fn test_retention_keeps_pending_critical() {
        let queue = CaseQueue::new(QueueConfig {
            max_cases: 2,
            ..Default::default()
        });
        let critical = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Critical))
            .unwrap()
            .unwrap();
        let older_medium = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Medium))
            .unwrap()
            .unwrap();
        let newer_medium = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Medium))
            .unwrap()
            .unwrap();

        assert_eq!(queue.len().unwrap(), 2);
        assert!(queue.get(critical.id).is_ok());
        // oldest within the least urgent tier goes first
        assert!(queue.get(older_medium.id).is_err());
        assert!(queue.get(newer_medium.id).is_ok());
    }

    #[test]
    fn test_full_queue_rejects_less_urgent_case() {
        let queue = CaseQueue::new(QueueConfig {
            max_cases: 1,
            ..Default::default()
        });
        let critical = queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Critical))
            .unwrap()
            .unwrap();

        let medium = queue.submit(new_case(Uuid::new_v4(), SeverityTier::Medium)).unwrap();
        assert!(medium.is_none());
        assert_eq!(queue.len().unwrap(), 1);
        assert!(queue.get(critical.id).is_ok());
    }

    #[test]
    fn test_zero_capacity_returns_none() {
        let queue = CaseQueue::new(QueueConfig {
            max_cases: 0,
            ..Default::default()
        });
        assert!(queue
            .submit(new_case(Uuid::new_v4(), SeverityTier::Critical))
            .unwrap()
            .is_none());
        assert!(queue.is_empty().unwrap());
    }

    fn tier() -> impl Strategy<Value = SeverityTier> {
        proptest::sample::select(SeverityTier::BY_URGENCY.to_vec())
    }

    proptest! {
        #[test]
        fn list_is_sorted_by_urgency(tiers in proptest::collection::vec(tier(), 0..40)) {
            let queue = CaseQueue::new(QueueConfig {
                escalation_threshold: SeverityTier::Low,
                max_cases: 1000,
            });
            for t in &tiers {
                queue.submit(new_case(Uuid::new_v4(), *t)).unwrap();
            }
            let ranks: Vec<_> = queue
                .list(&CaseFilter::default())
                .unwrap()
                .iter()
                .map(|c| c.severity.urgency_rank())
                .collect();
            prop_assert_eq!(ranks.len(), tiers.len());
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn retention_never_drops_critical_for_lower_tier(tiers in proptest::collection::vec(tier(), 0..40)) {
            let queue = CaseQueue::new(QueueConfig {
                escalation_threshold: SeverityTier::Low,
                max_cases: 5,
            });
            let mut critical_ids = Vec::new();
            for t in &tiers {
                if let Some(case) = queue.submit(new_case(Uuid::new_v4(), *t)).unwrap() {
                    if case.severity == SeverityTier::Critical {
                        critical_ids.push(case.id);
                    }
                }
            }
            let held = queue.list(&CaseFilter::default()).unwrap();
            let retained = critical_ids.iter().filter(|id| queue.get(**id).is_ok()).count();
            // criticals are only lost when the queue is full of criticals
            if retained < critical_ids.len() {
                prop_assert!(held.iter().all(|c| c.severity == SeverityTier::Critical));
                prop_assert_eq!(held.len(), 5);
            }
        }
    }
}
