//! Scripted model for tests and offline runs

use crate::{Completion, GenAiError, GenerativeModel, Turn};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A model that answers every call the same way
pub struct MockModel {
    outcome: Result<String, GenAiError>,
    calls: AtomicUsize,
    last_history_len: Mutex<Option<usize>>,
}

impl MockModel {
    /// Always reply with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_outcome(Ok(text.into()))
    }

    /// Always fail with `error`
    pub fn failing(error: GenAiError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, GenAiError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_history_len: Mutex::new(None),
        }
    }

    /// Number of completed calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of prior turns passed on the most recent call
    pub fn last_history_len(&self) -> Option<usize> {
        self.last_history_len.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn complete(
        &self,
        _latest_message: &str,
        prior_turns: &[Turn],
    ) -> Result<Completion, GenAiError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_history_len.lock() {
            *last = Some(prior_turns.len());
        }

        self.outcome.clone().map(|reply_text| Completion { reply_text })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replying() {
        let model = MockModel::replying("hello");
        let history = vec![Turn::patient("hi")];
        let completion = model.complete("again", &history).await.unwrap();
        assert_eq!(completion.reply_text, "hello");
        assert_eq!(model.calls(), 1);
        assert_eq!(model.last_history_len(), Some(1));
    }

    #[tokio::test]
    async fn test_failing() {
        let model = MockModel::failing(GenAiError::Timeout(50));
        assert!(matches!(
            model.complete("x", &[]).await,
            Err(GenAiError::Timeout(50))
        ));
    }
}
