//! Fallback Responder Implementation

use serde::{Deserialize, Serialize};
use severity_classifier::SeverityTier;
use std::fmt;
use tracing::debug;

/// What the fallback reply addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyTopic {
    /// Suicidal ideation or self-harm
    Crisis,
    /// Anxiety or sleep trouble
    AnxietySleep,
    /// Work or family stress
    Stress,
    /// Nothing specific recognised
    General,
}

impl ReplyTopic {
    /// Canned supportive reply for this topic
    pub fn reply(&self) -> &'static str {
        match self {
            ReplyTopic::Crisis => {
                "I hear you, and I want you to know you're not alone. Please reach out to a crisis \
                 helpline immediately. Your life matters. Would you like me to connect you with \
                 emergency services?"
            }
            ReplyTopic::AnxietySleep => {
                "I understand you're going through a difficult time. Anxiety and sleep issues are \
                 common, and there are effective ways to manage them. Can you tell me more about \
                 when these feelings started?"
            }
            ReplyTopic::Stress => {
                "Stress can feel overwhelming, especially with work and family responsibilities. \
                 Let's talk about what's causing the most pressure. Are there specific situations \
                 that trigger this stress?"
            }
            ReplyTopic::General => {
                "Thank you for sharing. I'm here to listen and help. Could you tell me more about \
                 how you've been feeling lately?"
            }
        }
    }
}

/// Why a fallback reply was used instead of a generated one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No API credential configured
    MissingCredential,
    /// The service call failed
    ServiceFailure(String),
}

impl FallbackReason {
    /// Fixed notice shown alongside the fallback reply
    pub fn notice(&self) -> &'static str {
        match self {
            FallbackReason::MissingCredential => {
                "I appreciate you sharing, but the AI service is not properly configured. \
                 Supportive responses are being provided offline."
            }
            FallbackReason::ServiceFailure(_) => {
                "I apologize, but I encountered an issue. Please try again, or reach out to a \
                 mental health professional if you need immediate support."
            }
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential => f.write_str("missing credential"),
            FallbackReason::ServiceFailure(detail) => write!(f, "service failure: {}", detail),
        }
    }
}

/// Ordered topic rules over lowercased text, checked first to last
const TOPIC_RULES: &[(ReplyTopic, &[&str])] = &[
    (ReplyTopic::Crisis, &["suicid", "die", "end my life"]),
    (
        ReplyTopic::AnxietySleep,
        &["anxious", "ఆందోళన", "चिंता", "can't sleep", "నిద్ర", "नींद"],
    ),
    (ReplyTopic::Stress, &["stress", "ఒత్తిడి", "तनाव"]),
];

/// Picks canned replies by topic
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    pub fn new() -> Self {
        Self
    }

    /// Topic of `text` by the first matching rule
    pub fn topic(&self, text: &str) -> ReplyTopic {
        let lowered = text.to_lowercase();
        TOPIC_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(ReplyTopic::General)
    }

    /// Canned reply for `text`
    pub fn reply(&self, text: &str) -> &'static str {
        self.topic(text).reply()
    }

    /// Canned reply that never under-reacts to the classifier's tier
    ///
    /// A `Critical` tier always gets the crisis reply even when no crisis
    /// topic keyword matched.
    pub fn reply_for(&self, text: &str, severity: SeverityTier) -> &'static str {
        let topic = if severity.requires_emergency() {
            ReplyTopic::Crisis
        } else {
            self.topic(text)
        };
        debug!("Fallback topic {:?} for {} message", topic, severity);
        topic.reply()
    }
}
