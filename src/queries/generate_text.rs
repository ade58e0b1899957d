use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Total attempts against the inference endpoint, across both backoff kinds.
pub const MAX_ATTEMPTS: u8 = 3;
/// Wait while the remote model is still loading (HTTP 503).
pub const MODEL_LOAD_WAIT: Duration = Duration::from_secs(30);
/// Wait between attempts after an ordinary failure.
pub const RETRY_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Text generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Hugging Face API error: {status_text} ({status})")]
    BadStatus { status: u16, status_text: String },
    #[error("No generated text in model response")]
    EmptyResponse,
    #[error("All retry attempts failed")]
    Exhausted,
}

/// Outcome of a single inference attempt, as seen by the retry machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// The service answered 503: the model is still loading. Retried after
    /// a long wait, without recording an error.
    ModelLoading,
    /// Any other failure. Recorded and retried after a short wait.
    Failed,
}

/// The retry loop as an explicit state machine, so the model-loading backoff
/// and the generic-failure backoff stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting { remaining: u8 },
    WaitingForModelLoad { remaining: u8 },
    WaitingBeforeRetry { remaining: u8 },
    Succeeded,
    Exhausted,
}

impl RetryState {
    pub fn start() -> Self {
        RetryState::Attempting {
            remaining: MAX_ATTEMPTS,
        }
    }

    /// Advance after an attempt. Every attempt consumes budget; the final
    /// states absorb further outcomes.
    pub fn on_outcome(self, outcome: AttemptOutcome) -> Self {
        match (self, outcome) {
            (RetryState::Attempting { .. }, AttemptOutcome::Success) => RetryState::Succeeded,
            (RetryState::Attempting { remaining }, AttemptOutcome::ModelLoading) => {
                if remaining > 1 {
                    RetryState::WaitingForModelLoad {
                        remaining: remaining - 1,
                    }
                } else {
                    RetryState::Exhausted
                }
            }
            (RetryState::Attempting { remaining }, AttemptOutcome::Failed) => {
                if remaining > 1 {
                    RetryState::WaitingBeforeRetry {
                        remaining: remaining - 1,
                    }
                } else {
                    RetryState::Exhausted
                }
            }
            (state, _) => state,
        }
    }

    /// How long to sleep before the next attempt, if the state is a wait.
    pub fn wait(self) -> Option<Duration> {
        match self {
            RetryState::WaitingForModelLoad { .. } => Some(MODEL_LOAD_WAIT),
            RetryState::WaitingBeforeRetry { .. } => Some(RETRY_WAIT),
            _ => None,
        }
    }

    /// Leave a wait state and attempt again.
    pub fn resume(self) -> Self {
        match self {
            RetryState::WaitingForModelLoad { remaining }
            | RetryState::WaitingBeforeRetry { remaining } => {
                RetryState::Attempting { remaining }
            }
            state => state,
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    options: InferenceOptions,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f64,
    top_p: f64,
    do_sample: bool,
    return_full_text: bool,
    repetition_penalty: f64,
    length_penalty: f64,
    stop: Vec<&'static str>,
    truncation: bool,
}

impl Default for InferenceParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 300,
            temperature: 0.7,
            top_p: 0.95,
            do_sample: true,
            return_full_text: false,
            repetition_penalty: 1.2,
            length_penalty: 1.0,
            stop: vec!["</s>", "[/INST]"],
            truncation: true,
        }
    }
}

/// Model responses come back either as a bare object or a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

enum AttemptError {
    ModelLoading,
    Failed(GenerationError),
}

/// Client for the remote text-generation service.
pub struct TextGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl TextGenerator {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// Run a prompt through the model with bounded retries. A 503 from the
    /// service waits for the model to load; other failures back off briefly
    /// and keep the last error for the caller.
    pub async fn generate(
        &self,
        token: &str,
        model_id: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let mut state = RetryState::start();
        let mut last_error: Option<GenerationError> = None;

        loop {
            state = match state {
                RetryState::Attempting { remaining } => {
                    match self.attempt(token, model_id, prompt).await {
                        Ok(text) => return Ok(text),
                        Err(AttemptError::ModelLoading) => {
                            info!("Model is loading, retries left: {}", remaining - 1);
                            state.on_outcome(AttemptOutcome::ModelLoading)
                        }
                        Err(AttemptError::Failed(e)) => {
                            error!("Attempt failed, retries left: {}: {}", remaining - 1, e);
                            last_error = Some(e);
                            state.on_outcome(AttemptOutcome::Failed)
                        }
                    }
                }
                RetryState::WaitingForModelLoad { .. } | RetryState::WaitingBeforeRetry { .. } => {
                    if let Some(wait) = state.wait() {
                        tokio::time::sleep(wait).await;
                    }
                    state.resume()
                }
                // Success returns straight from the attempt arm, so both
                // terminal states mean the budget ran out.
                RetryState::Succeeded | RetryState::Exhausted => {
                    return Err(last_error.unwrap_or(GenerationError::Exhausted));
                }
            };
        }
    }

    async fn attempt(
        &self,
        token: &str,
        model_id: &str,
        prompt: &str,
    ) -> Result<String, AttemptError> {
        let body = InferenceRequest {
            inputs: prompt,
            options: InferenceOptions {
                wait_for_model: true,
                use_cache: false,
            },
            parameters: InferenceParameters::default(),
        };

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, model_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptError::Failed(e.into()))?;

        let status = response.status();
        if status.as_u16() == 503 {
            return Err(AttemptError::ModelLoading);
        }

        if !status.is_success() {
            let headers = format!("{:?}", response.headers());
            let error_body = response.text().await.unwrap_or_default();
            error!(
                "Hugging Face API error: status={} body={} headers={}",
                status.as_u16(),
                error_body,
                headers
            );
            return Err(AttemptError::Failed(GenerationError::BadStatus {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            }));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Failed(GenerationError::Http(e)))?;

        let text = match parsed {
            InferenceResponse::Many(items) => items
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or(AttemptError::Failed(GenerationError::EmptyResponse))?,
            InferenceResponse::One(g) => g.generated_text,
        };
        Ok(text)
    }
}
