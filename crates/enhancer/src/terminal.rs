//! Line-oriented recovery prompts for terminal hosts.

use async_trait::async_trait;
use enhancer_error::{RecoveryError, RecoveryErrorKind};
use enhancer_openai::{
    OpenAiClient, SettingsUpdate, validate_max_tokens, validate_model, validate_temperature,
    validate_timeout,
};
use enhancer_retry::{ErrorClassification, RecoveryUi, RetryChoice, TerminalChoice};
use std::fmt::Display;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Parse an answer to the retry prompt.
///
/// An empty answer means retry.
pub fn parse_retry_choice(answer: &str) -> Option<RetryChoice> {
    match answer.trim().to_lowercase().as_str() {
        "" | "r" | "retry" => Some(RetryChoice::Retry),
        "s" | "settings" => Some(RetryChoice::ChangeSettings),
        "k" | "key" => Some(RetryChoice::ReconfigureCredential),
        "c" | "cancel" | "q" | "quit" => Some(RetryChoice::Abort),
        _ => None,
    }
}

/// Parse an answer to the terminal prompt.
///
/// An empty answer means cancel.
pub fn parse_terminal_choice(answer: &str) -> Option<TerminalChoice> {
    match answer.trim().to_lowercase().as_str() {
        "k" | "key" => Some(TerminalChoice::RetryWithNewCredential),
        "" | "c" | "cancel" | "q" | "quit" => Some(TerminalChoice::Abort),
        _ => None,
    }
}

fn describe(classification: &ErrorClassification) -> String {
    let mut text = format!(
        "\n✗ {}\n  {}\n  → {}\n",
        classification.kind().summary(),
        classification.message(),
        classification.suggestion()
    );
    if let Some(wait) = classification.retry_after() {
        text.push_str(&format!(
            "  Next attempt possible in {}s\n",
            wait.as_millis().div_ceil(1000)
        ));
    }
    text
}

struct Prompter {
    input: Box<dyn AsyncBufRead + Send + Unpin>,
    output: Box<dyn AsyncWrite + Send + Unpin>,
}

impl Prompter {
    async fn say(&mut self, text: &str) -> Result<(), RecoveryError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, RecoveryError> {
        self.say(prompt).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(RecoveryError::new(RecoveryErrorKind::InputClosed));
        }
        Ok(line.trim().to_string())
    }

    async fn choose<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Option<T> + Send,
    ) -> Result<T, RecoveryError> {
        loop {
            let answer = self.ask(prompt).await?;
            if let Some(choice) = parse(&answer) {
                return Ok(choice);
            }
            self.say("  Unrecognized choice.\n").await?;
        }
    }

    // Empty answer keeps the current value.
    async fn field<T>(
        &mut self,
        label: &str,
        current: impl Display + Send,
        parse: impl Fn(&str) -> Result<T, String> + Send,
    ) -> Result<Option<T>, RecoveryError> {
        loop {
            let answer = self.ask(&format!("  {} [{}]: ", label, current)).await?;
            if answer.is_empty() {
                return Ok(None);
            }
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(reason) => self.say(&format!("  {}\n", reason)).await?,
            }
        }
    }
}

/// [`RecoveryUi`] over a line-based reader and writer, normally stdin and stderr.
///
/// Credentials and settings are applied directly to the shared [`OpenAiClient`].
pub struct TerminalRecovery {
    client: Arc<OpenAiClient>,
    io: Mutex<Prompter>,
}

impl TerminalRecovery {
    /// Prompt on stderr and read answers from stdin.
    pub fn stdio(client: Arc<OpenAiClient>) -> Self {
        Self::new(client, BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }

    /// Prompt on `output` and read answers from `input`.
    pub fn new<I, O>(client: Arc<OpenAiClient>, input: I, output: O) -> Self
    where
        I: AsyncBufRead + Send + Unpin + 'static,
        O: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            client,
            io: Mutex::new(Prompter {
                input: Box::new(input),
                output: Box::new(output),
            }),
        }
    }
}

impl std::fmt::Debug for TerminalRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalRecovery").finish_non_exhaustive()
    }
}

#[async_trait]
impl RecoveryUi for TerminalRecovery {
    #[instrument(skip_all, fields(kind = %classification.kind()))]
    async fn present_retry_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<RetryChoice, RecoveryError> {
        let mut io = self.io.lock().await;
        io.say(&describe(classification)).await?;
        let choice = io
            .choose(
                "  [r]etry, [s]ettings, new [k]ey, [c]ancel > ",
                parse_retry_choice,
            )
            .await?;
        debug!(?choice, "Retry choice");
        Ok(choice)
    }

    #[instrument(skip_all, fields(kind = %classification.kind()))]
    async fn present_terminal_choice(
        &self,
        classification: &ErrorClassification,
    ) -> Result<TerminalChoice, RecoveryError> {
        let offers_key = classification.kind().offers_credential_fix();
        let prompt = if offers_key {
            "  new [k]ey, [c]ancel > "
        } else {
            "  [c]ancel > "
        };
        let mut io = self.io.lock().await;
        io.say(&describe(classification)).await?;
        let choice = io
            .choose(prompt, |answer| {
                parse_terminal_choice(answer)
                    .filter(|choice| offers_key || *choice == TerminalChoice::Abort)
            })
            .await?;
        debug!(?choice, "Terminal choice");
        Ok(choice)
    }

    async fn collect_new_credential(&self) -> Result<Option<String>, RecoveryError> {
        let mut io = self.io.lock().await;
        let key = io.ask("  OpenAI API key (blank to cancel): ").await?;
        Ok((!key.is_empty()).then_some(key))
    }

    async fn apply_credential(&self, credential: String) -> Result<bool, RecoveryError> {
        self.client.set_api_key(credential);
        let applied = self.client.has_api_key();
        if applied {
            self.io.lock().await.say("  API key updated.\n").await?;
        }
        Ok(applied)
    }

    #[instrument(skip_all)]
    async fn collect_settings_change(&self) -> Result<(), RecoveryError> {
        let current = self.client.settings();
        let mut io = self.io.lock().await;
        io.say("\nChange settings (Enter keeps the current value)\n")
            .await?;

        let update = SettingsUpdate {
            model: io
                .field("Model", &current.model, |s| {
                    validate_model(s)
                        .map(|_| s.to_string())
                        .map_err(|e| e.reason)
                })
                .await?,
            timeout_ms: io
                .field("Timeout (seconds)", current.timeout_ms / 1_000, |s| {
                    let secs: u64 = s.parse().map_err(|_| "Enter a whole number".to_string())?;
                    let ms = secs.saturating_mul(1_000);
                    validate_timeout(ms).map(|_| ms).map_err(|e| e.reason)
                })
                .await?,
            temperature: io
                .field("Temperature", current.temperature, |s| {
                    let t: f32 = s.parse().map_err(|_| "Enter a number".to_string())?;
                    validate_temperature(t).map(|_| t).map_err(|e| e.reason)
                })
                .await?,
            max_tokens: io
                .field("Max tokens", current.max_tokens, |s| {
                    let n: u32 = s.parse().map_err(|_| "Enter a whole number".to_string())?;
                    validate_max_tokens(n).map(|_| n).map_err(|e| e.reason)
                })
                .await?,
        };

        if update.is_empty() {
            io.say("  No changes.\n").await?;
            return Ok(());
        }

        match self.client.update_settings(&update) {
            Ok(settings) => {
                io.say(&format!(
                    "  Settings updated: model {}, timeout {}s, temperature {}, max tokens {}\n",
                    settings.model,
                    settings.timeout_ms / 1_000,
                    settings.temperature,
                    settings.max_tokens
                ))
                .await?
            }
            Err(e) => {
                io.say(&format!("  Settings not applied: {} {}\n", e.field, e.reason))
                    .await?
            }
        }
        Ok(())
    }
}
