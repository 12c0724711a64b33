//! Generative AI Error Types

use thiserror::Error;

/// Errors from the generative AI service
#[derive(Debug, Clone, Error)]
pub enum GenAiError {
    /// No API key configured
    #[error("No API credential configured")]
    MissingCredential,

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request did not complete in time
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Service answered with a non-success status
    #[error("Service returned status {code}: {body}")]
    Status { code: u16, body: String },

    /// Body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Decoded fine but contained no reply text
    #[error("Service returned an empty reply")]
    EmptyReply,
}

impl GenAiError {
    /// Whether the failure is a configuration problem rather than a service fault
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, GenAiError::MissingCredential)
    }
}
