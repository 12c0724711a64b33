//! Triage Case Queue
//!
//! Escalates triaged messages to health workers, deduplicates repeated
//! escalations from one conversation, and orders cases by urgency.

mod queue;

pub use queue::{
    recommendation, Case, CaseFilter, CaseQueue, CaseStatus, NewCase, QueueConfig, TierCounts,
};

use thiserror::Error;
use uuid::Uuid;

/// Queue errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Case not found: {0}")]
    NotFound(Uuid),
    #[error("Queue lock poisoned")]
    LockPoisoned,
}
