//! Triage Engine Implementation

use fallback::{FallbackReason, FallbackResponder};
use genai_client::{GenAiError, GenerativeModel, Turn};
use serde::{Deserialize, Serialize};
use severity_classifier::{
    detect_idioms, detect_language, Classification, Idiom, Language, SeverityClassifier,
    SeverityTier,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Opening assistant turn of every conversation
    pub welcome_message: String,
    /// Longest accepted patient message (characters)
    pub max_message_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hello, I'm here to listen. How are you feeling today? You can \
                              write in English, Telugu or Hindi."
                .to_string(),
            max_message_chars: 2000,
        }
    }
}

/// Local, model-independent reading of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub classification: Classification,
    pub language: Language,
    pub idioms: Vec<Idiom>,
}

impl Assessment {
    pub fn severity(&self) -> SeverityTier {
        self.classification.severity
    }
}

/// Reply to one patient message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TriageReply {
    /// Reply written by the generative model
    Generated { text: String, severity: SeverityTier },
    /// Canned reply used because the model was unavailable
    Fallback {
        text: String,
        severity: SeverityTier,
        reason: FallbackReason,
    },
}

impl TriageReply {
    pub fn text(&self) -> &str {
        match self {
            TriageReply::Generated { text, .. } | TriageReply::Fallback { text, .. } => text,
        }
    }

    pub fn severity(&self) -> SeverityTier {
        match self {
            TriageReply::Generated { severity, .. } | TriageReply::Fallback { severity, .. } => {
                *severity
            }
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            TriageReply::Generated { .. } => None,
            TriageReply::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }

    /// Metric label for where the text came from
    pub fn source(&self) -> &'static str {
        match self {
            TriageReply::Generated { .. } => "generated",
            TriageReply::Fallback { .. } => "fallback",
        }
    }
}

/// Stateless triage pipeline shared by all conversations
pub struct TriageEngine {
    config: EngineConfig,
    classifier: SeverityClassifier,
    responder: FallbackResponder,
    model: Option<Arc<dyn GenerativeModel>>,
}

impl TriageEngine {
    /// Create an engine; `model` is `None` when no AI service is configured
    pub fn new(
        config: EngineConfig,
        classifier: SeverityClassifier,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        match &model {
            Some(m) => info!("Creating triage engine with model {}", m.name()),
            None => info!("Creating triage engine in offline mode"),
        }
        Self {
            config,
            classifier,
            responder: FallbackResponder::new(),
            model,
        }
    }

    /// Engine with default keywords and no model
    pub fn offline() -> Self {
        Self::new(EngineConfig::default(), SeverityClassifier::default(), None)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the configured model, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Classify and extract text signals without contacting the model
    pub fn assess(&self, message: &str) -> Assessment {
        Assessment {
            classification: self.classifier.classify_with_match(message),
            language: detect_language(message),
            idioms: detect_idioms(message),
        }
    }

    /// Produce the reply for `message`
    ///
    /// Never fails: when the model is missing or errors, the fallback
    /// responder supplies the text and the local tier is kept.
    pub async fn respond(&self, message: &str, history: &[Turn]) -> TriageReply {
        let severity = self.classifier.classify(message);
        self.respond_as(message, severity, history).await
    }

    /// Produce the reply for a message already classified as `severity`
    pub async fn respond_as(
        &self,
        message: &str,
        severity: SeverityTier,
        history: &[Turn],
    ) -> TriageReply {
        let start = Instant::now();

        let outcome = match &self.model {
            Some(model) => model.complete(message, history).await,
            None => Err(GenAiError::MissingCredential),
        };

        let reply = match outcome {
            Ok(completion) => TriageReply::Generated {
                text: completion.reply_text,
                severity,
            },
            Err(err) => {
                let reason = if err.is_missing_credential() {
                    FallbackReason::MissingCredential
                } else {
                    warn!("Generative model failed, using fallback reply: {}", err);
                    FallbackReason::ServiceFailure(err.to_string())
                };
                TriageReply::Fallback {
                    text: self.responder.reply_for(message, severity).to_string(),
                    severity,
                    reason,
                }
            }
        };

        debug!(
            "Reply ready in {}ms (source: {}, severity: {})",
            start.elapsed().as_millis(),
            reply.source(),
            severity
        );
        metrics::counter!(
            "triage_messages_total",
            "severity" => severity.as_str(),
            "source" => reply.source()
        )
        .increment(1);

        reply
    }
}
