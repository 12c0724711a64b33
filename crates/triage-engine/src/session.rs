//! Triage conversations

use crate::engine::{Assessment, TriageEngine, TriageReply};
use crate::TriageError;
use chrono::{DateTime, Utc};
use genai_client::Turn;
use severity_classifier::SeverityTier;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of one patient turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: TriageReply,
    pub assessment: Assessment,
}

/// A patient's chat with the triage assistant
///
/// `send` takes `&mut self`, so a conversation has at most one message in
/// flight and turns are recorded strictly in order.
pub struct Conversation {
    id: Uuid,
    engine: Arc<TriageEngine>,
    turns: Vec<Turn>,
    severity: SeverityTier,
    peak_severity: SeverityTier,
    started_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation with the engine's welcome turn
    pub fn new(engine: Arc<TriageEngine>) -> Self {
        let id = Uuid::new_v4();
        let welcome = Turn::assistant(engine.config().welcome_message.clone());
        info!("Starting conversation {}", id);
        Self {
            id,
            engine,
            turns: vec![welcome],
            severity: SeverityTier::Low,
            peak_severity: SeverityTier::Low,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Tier of the latest patient message
    pub fn severity(&self) -> SeverityTier {
        self.severity
    }

    /// Highest tier seen in this conversation
    pub fn peak_severity(&self) -> SeverityTier {
        self.peak_severity
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Send a patient message and record the assistant's reply
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, TriageError> {
        if text.trim().is_empty() {
            return Err(TriageError::EmptyMessage);
        }
        let len = text.chars().count();
        let max = self.engine.config().max_message_chars;
        if len > max {
            return Err(TriageError::MessageTooLong { len, max });
        }

        let assessment = self.engine.assess(text);
        let reply = self
            .engine
            .respond_as(text, assessment.severity(), &self.turns)
            .await;

        self.turns.push(Turn::patient(text));
        self.turns.push(Turn::assistant(reply.text()));
        self.severity = reply.severity();
        self.peak_severity = self.peak_severity.max(self.severity);
        debug!(
            "Conversation {} turn {} -> {}",
            self.id,
            self.turns.len() / 2,
            self.severity
        );

        Ok(TurnOutcome { reply, assessment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use genai_client::{GenerativeModel, MockModel, Speaker};
    use severity_classifier::SeverityClassifier;

    #[tokio::test]
    async fn test_turns_recorded_in_order() {
        let model = Arc::new(MockModel::replying("Tell me more."));
        let engine = Arc::new(TriageEngine::new(
            EngineConfig::default(),
            SeverityClassifier::default(),
            Some(model.clone() as Arc<dyn GenerativeModel>),
        ));
        let mut conversation = Conversation::new(engine);

        conversation.send("I feel worried").await.unwrap();
        // welcome turn only
        assert_eq!(model.last_history_len(), Some(1));

        conversation.send("and stressed").await.unwrap();
        assert_eq!(model.last_history_len(), Some(3));

        let speakers: Vec<_> = conversation.turns().iter().map(|t| t.speaker).collect();
        assert_eq!(
            speakers,
            vec![
                Speaker::Assistant,
                Speaker::Patient,
                Speaker::Assistant,
                Speaker::Patient,
                Speaker::Assistant,
            ]
        );
        assert_eq!(conversation.turns()[3].text, "and stressed");
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let mut conversation = Conversation::new(Arc::new(TriageEngine::offline()));
        assert_eq!(
            conversation.send("   \n").await.unwrap_err(),
            TriageError::EmptyMessage
        );
        assert_eq!(conversation.turns().len(), 1);
    }

    #[tokio::test]
    async fn test_long_message_rejected() {
        let engine = TriageEngine::new(
            EngineConfig {
                max_message_chars: 10,
                ..Default::default()
            },
            SeverityClassifier::default(),
            None,
        );
        let mut conversation = Conversation::new(Arc::new(engine));
        assert_eq!(
            conversation.send("this is far too long").await.unwrap_err(),
            TriageError::MessageTooLong { len: 20, max: 10 }
        );
    }

    #[tokio::test]
    async fn test_severity_tracking() {
        let mut conversation = Conversation::new(Arc::new(TriageEngine::offline()));

        let outcome = conversation.send("Everything feels unbearable").await.unwrap();
        assert_eq!(outcome.reply.severity(), SeverityTier::High);
        assert!(outcome.reply.is_fallback());

        conversation.send("thanks, a little better now").await.unwrap();
        assert_eq!(conversation.severity(), SeverityTier::Low);
        assert_eq!(conversation.peak_severity(), SeverityTier::High);
    }
}
