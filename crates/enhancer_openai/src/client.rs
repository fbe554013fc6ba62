//! OpenAI chat-completions client using reqwest.

use crate::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole,
    DEFAULT_SYSTEM_PROMPT, EnhancementRequest, EnhancementResult, OpenAiSettings, SettingsUpdate,
};
use enhancer_error::{OpenAiError, OpenAiErrorKind, SettingsError};
use reqwest::Client;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// OpenAI client shared by every enhancement run.
///
/// The credential and settings sit behind locks so a recovery prompt can swap them while other
/// runs hold the same `Arc<OpenAiClient>`. Each request reads a snapshot of both before it is
/// sent.
#[derive(Debug)]
pub struct OpenAiClient {
    http: Client,
    api_key: RwLock<Option<String>>,
    settings: RwLock<OpenAiSettings>,
}

impl OpenAiClient {
    /// Creates a client with no credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the HTTP client cannot be built.
    #[instrument(skip_all, fields(model = %settings.model, base_url = %settings.base_url))]
    pub fn new(settings: OpenAiSettings) -> Result<Self, OpenAiError> {
        settings.validate().map_err(|e| {
            OpenAiError::new(OpenAiErrorKind::ClientCreation(format!(
                "invalid settings: {} {}",
                e.field, e.reason
            )))
        })?;

        let http = Client::builder()
            .user_agent(concat!("prompt-enhancer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenAiError::new(OpenAiErrorKind::ClientCreation(e.to_string())))?;

        debug!("Created OpenAI client");

        Ok(Self {
            http,
            api_key: RwLock::new(None),
            settings: RwLock::new(settings),
        })
    }

    /// Sets the initial credential.
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.set_api_key(api_key);
        self
    }

    /// Replaces the credential. Blank keys clear it.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into().trim().to_string();
        let mut slot = self.api_key.write().unwrap_or_else(PoisonError::into_inner);
        *slot = (!api_key.is_empty()).then_some(api_key);
        debug!(configured = slot.is_some(), "API key updated");
    }

    /// Whether a credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> OpenAiSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge and apply a partial settings change.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the settings untouched, if any updated field is out of range.
    #[instrument(skip(self))]
    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<OpenAiSettings, SettingsError> {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        let merged = settings.merged(update)?;
        *settings = merged.clone();
        info!(
            model = %merged.model,
            max_tokens = merged.max_tokens,
            temperature = merged.temperature,
            timeout_ms = merged.timeout_ms,
            "Settings updated"
        );
        Ok(merged)
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Enhance a prompt with one chat-completions call.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is set, the request fails or times out, the API
    /// answers with a non-success status, or the completion is empty.
    #[instrument(skip(self, request), fields(text_len = request.text().len()))]
    pub async fn enhance(
        &self,
        request: &EnhancementRequest,
    ) -> Result<EnhancementResult, OpenAiError> {
        let api_key = self
            .api_key()
            .ok_or_else(|| OpenAiError::new(OpenAiErrorKind::MissingApiKey))?;
        let settings = self.settings();

        let body = build_request(request, &settings)?;
        let url = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));

        debug!(
            model = %settings.model,
            url = %url,
            max_tokens = settings.max_tokens,
            "Sending request to OpenAI"
        );

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .bearer_auth(&api_key)
            .timeout(settings.timeout())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "API error");
            return Err(OpenAiError::new(OpenAiErrorKind::HttpStatus {
                status_code: status.as_u16(),
                message: error_message(&error_text),
            }));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to decode response");
            if e.is_timeout() {
                transport_error(e)
            } else {
                OpenAiError::new(OpenAiErrorKind::Decode(e.to_string()))
            }
        })?;

        let enhanced_text = completion
            .first_text()
            .ok_or_else(|| OpenAiError::new(OpenAiErrorKind::EmptyResponse))?
            .to_string();
        let tokens_used = completion
            .usage()
            .map(|usage| *usage.total_tokens())
            .unwrap_or(0);
        let processing_time = start.elapsed();

        info!(
            model = %completion.model(),
            tokens_used,
            processing_ms = processing_time.as_millis() as u64,
            "Enhancement completed"
        );

        Ok(EnhancementResult::new(
            enhanced_text,
            tokens_used,
            completion.model().clone(),
            processing_time,
        ))
    }
}

fn build_request(
    request: &EnhancementRequest,
    settings: &OpenAiSettings,
) -> Result<ChatCompletionRequest, OpenAiError> {
    let message = |role: ChatRole, content: String| {
        ChatMessage::builder()
            .role(role)
            .content(content)
            .build()
            .map_err(|e| OpenAiError::new(OpenAiErrorKind::Request(e.to_string())))
    };

    ChatCompletionRequest::builder()
        .model(settings.model.clone())
        .messages(vec![
            message(ChatRole::System, DEFAULT_SYSTEM_PROMPT.to_string())?,
            message(ChatRole::User, request.user_prompt())?,
        ])
        .max_tokens(settings.max_tokens)
        .temperature(settings.temperature)
        .build()
        .map_err(|e| OpenAiError::new(OpenAiErrorKind::Request(e.to_string())))
}

fn transport_error(e: reqwest::Error) -> OpenAiError {
    if e.is_timeout() {
        OpenAiError::new(OpenAiErrorKind::Timeout(e.to_string()))
    } else if e.is_connect() {
        OpenAiError::new(OpenAiErrorKind::Connect(e.to_string()))
    } else {
        OpenAiError::new(OpenAiErrorKind::Request(e.to_string()))
    }
}

// Prefer the structured error envelope; fall back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.summary(),
        Err(_) => body.trim().to_string(),
    }
}
