//! Generative AI Client
//!
//! The conversational reply for a triage message comes from an external
//! generative-text service. This crate defines the [`GenerativeModel`] seam,
//! the conversation types passed across it, and a Gemini REST implementation.

mod error;
mod gemini;
mod mock;
mod types;

pub use error::GenAiError;
pub use gemini::{GeminiClient, GeminiConfig, SYSTEM_PROMPT};
pub use mock::MockModel;
pub use types::{Completion, Speaker, Turn};

use async_trait::async_trait;

/// A text-completion service that continues a conversation
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Produce a reply to `latest_message` given the earlier turns, oldest first
    async fn complete(
        &self,
        latest_message: &str,
        prior_turns: &[Turn],
    ) -> Result<Completion, GenAiError>;

    /// Model identifier for logs and health output
    fn name(&self) -> &str;
}
