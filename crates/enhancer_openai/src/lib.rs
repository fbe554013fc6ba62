//! OpenAI chat-completions transport for the prompt enhancer.
//!
//! [`OpenAiClient::enhance`] turns an [`EnhancementRequest`] into one system + user chat
//! request and returns the trimmed completion. Failures come back as
//! [`OpenAiError`](enhancer_error::OpenAiError), which implements
//! [`AsRawFailure`](enhancer_error::AsRawFailure) so the retry coordinator can classify them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod dto;
mod request;
mod settings;

pub use client::OpenAiClient;
pub use dto::{
    ApiErrorBody, ApiErrorDetail, ChatChoice, ChatCompletionRequest, ChatCompletionRequestBuilder,
    ChatCompletionResponse, ChatMessage, ChatMessageBuilder, ChatResponseMessage, ChatRole,
    ChatUsage,
};
pub use request::{
    DEFAULT_SYSTEM_PROMPT, EnhancementRequest, EnhancementResult, MAX_TEXT_CHARS, MIN_TEXT_CHARS,
};
pub use settings::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, MAX_TOKENS_RANGE, OpenAiSettings, SettingsUpdate,
    TEMPERATURE_RANGE, TIMEOUT_RANGE_MS, validate_max_tokens, validate_model,
    validate_temperature, validate_timeout,
};
