//! Gemini REST Client

use crate::{Completion, GenAiError, GenerativeModel, Speaker, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Instruction sent with every conversation
pub const SYSTEM_PROMPT: &str = "\
You are a compassionate mental health triage assistant for rural mental health care.
Your role is to:
1. Listen empathetically to patients' mental health concerns
2. Provide supportive responses in the user's language
3. Assess severity and risk factors
4. Recommend appropriate care resources
5. Be culturally sensitive and aware of rural context

Keep responses concise (2-3 sentences), warm, and non-judgmental.
Never provide medical diagnosis, but always encourage professional help for serious concerns.";

/// Longest error body kept in a `Status` error
const MAX_ERROR_BODY: usize = 512;

/// Gemini client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; calls fail with `MissingCredential` when absent
    pub api_key: Option<String>,
    /// Model name (default: gemini-1.5-flash)
    pub model: String,
    /// API root, overridable for tests and proxies
    pub base_url: String,
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Reply length cap
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 15_000,
            temperature: None,
            max_output_tokens: Some(256),
        }
    }
}

// Hand-written so the key never reaches the logs.
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl<'a> Content<'a> {
    fn text(role: Option<&'static str>, text: &'a str) -> Self {
        Self {
            role,
            parts: vec![Part { text }],
        }
    }
}

fn role_for(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Patient => "user",
        Speaker::Assistant => "model",
    }
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: GeminiConfig) -> Result<Self, GenAiError> {
        info!("Creating Gemini client with config: {:?}", config);
        if config.api_key.is_none() {
            warn!("No Gemini API key set; every reply will use the fallback responder");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GenAiError::Http(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Whether an API key is configured
    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body
    ///
    /// History must open with a user turn, so leading assistant turns (the
    /// welcome message) are dropped.
    fn build_request<'a>(
        &self,
        latest_message: &'a str,
        prior_turns: &'a [Turn],
    ) -> GenerateContentRequest<'a> {
        let mut contents: Vec<Content<'a>> = prior_turns
            .iter()
            .skip_while(|turn| turn.speaker == Speaker::Assistant)
            .map(|turn| Content::text(Some(role_for(turn.speaker)), &turn.text))
            .collect();
        contents.push(Content::text(Some("user"), latest_message));

        GenerateContentRequest {
            system_instruction: Content::text(None, SYSTEM_PROMPT),
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> GenAiError {
        if err.is_timeout() {
            GenAiError::Timeout(self.config.timeout_ms)
        } else {
            GenAiError::Http(err.to_string())
        }
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, GenAiError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        Err(GenAiError::EmptyReply)
    } else {
        Ok(text.to_string())
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn complete(
        &self,
        latest_message: &str,
        prior_turns: &[Turn],
    ) -> Result<Completion, GenAiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenAiError::MissingCredential)?;

        let body = self.build_request(latest_message, prior_turns);
        debug!(
            "Sending Gemini request ({} contents) to model {}",
            body.contents.len(),
            self.config.model
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
                body.truncate(cut);
            }
            return Err(GenAiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::MalformedResponse(e.to_string()))?;

        let reply_text = extract_reply(decoded)?;
        debug!("Gemini reply received ({} chars)", reply_text.len());
        Ok(Completion { reply_text })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
