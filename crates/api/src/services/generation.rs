//! Retry/backoff wrapper around a text-generation backend.
//!
//! Masks transient model failures from callers: each attempt is issued
//! sequentially (never in parallel - concurrent attempts would multiply
//! provider billing), its output is sanitized and validated, and failures
//! are classified to pick the right delay before the next attempt.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// A single-call text generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Runs one generation call. `model` overrides the backend's default
    /// model selection.
    async fn generate<'a>(&self, prompt: &str, model: Option<&'a str>) -> Result<String>;
}

/// Options for a validated generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Error messages matching any of these (case-insensitive) are treated as
/// rate limiting and get exponential backoff instead of the fixed delay.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "too many requests", "model is overloaded"];

/// Fixed delay before retrying after a non-rate-limit error.
const RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Drives retries against a [`TextModel`] until an attempt validates.
pub struct GenerationClient {
    model: Arc<dyn TextModel>,
    credential: String,
}

impl GenerationClient {
    pub fn new(model: Arc<dyn TextModel>, credential: impl Into<String>) -> Self {
        Self {
            model,
            credential: credential.into(),
        }
    }

    /// Runs up to `max_retries` sequential attempts and returns the first
    /// sanitized response accepted by `validate`.
    ///
    /// - Empty responses are soft failures: retried with no delay.
    /// - Validator rejections are retried with no delay.
    /// - Rate-limit errors back off exponentially (capped at 30 s).
    /// - Any other error waits a fixed 2 s if attempts remain.
    ///
    /// On exhaustion the last captured error is returned, or a generic one
    /// when every attempt failed softly.
    pub async fn generate_validated<F>(
        &self,
        prompt: &str,
        model: Option<&str>,
        validate: F,
        opts: &GenerateOptions,
    ) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..opts.max_retries {
            let call = self.model.generate(prompt, model);
            let result = match tokio::time::timeout(opts.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!("generation timed out after {:?}", opts.timeout)),
            };

            match result {
                Ok(text) => {
                    if text.trim().is_empty() {
                        tracing::warn!(
                            attempt,
                            credential = %redact_credential(&self.credential),
                            "empty response from model"
                        );
                        continue;
                    }

                    let sanitized = sanitize_response(&text);
                    if validate(&sanitized) {
                        return Ok(sanitized);
                    }

                    tracing::warn!(
                        attempt,
                        credential = %redact_credential(&self.credential),
                        response = %truncate(&sanitized, 200),
                        "model response failed validation"
                    );
                }
                Err(err) => {
                    if is_rate_limited(&err.to_string()) {
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            credential = %redact_credential(&self.credential),
                            delay_ms = delay.as_millis() as u64,
                            "model backend rate limited, backing off"
                        );
                        last_error = Some(err);
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    tracing::warn!(
                        attempt,
                        credential = %redact_credential(&self.credential),
                        error = %err,
                        "generation attempt failed"
                    );
                    last_error = Some(err);

                    if attempt + 1 < opts.max_retries {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("no valid response from model")))
    }
}

/// Exponential backoff for rate-limit errors: min(2^attempt * 1s, 30s).
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis((1000u64 << attempt.min(5)).min(30_000))
}

fn is_rate_limited(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Strips one surrounding markdown code fence (with optional language tag)
/// and surrounding whitespace, leaving inner content untouched.
pub fn sanitize_response(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the opening fence line, language tag included
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);

    body.trim().to_string()
}

/// Redacts a credential for log output: first and last four characters, or a
/// fixed placeholder when it is too short to redact meaningfully.
pub fn redact_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();

    if chars.len() <= 8 {
        return "***".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
