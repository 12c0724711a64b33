//! Triage Engine
//!
//! Turns one patient message into a severity tier and a supportive reply.
//! The tier always comes from the local keyword classifier; the reply comes
//! from the generative model when it is reachable and from the rule-based
//! fallback responder otherwise.

mod engine;
mod session;

pub use engine::{Assessment, EngineConfig, TriageEngine, TriageReply};
pub use session::{Conversation, TurnOutcome};

use thiserror::Error;

/// Errors from the triage path
///
/// Model failures are never reported here; they become fallback replies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriageError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Message is {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },
}
