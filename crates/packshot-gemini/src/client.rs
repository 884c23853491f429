// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Provides [`GeminiClient`], which handles request construction,
//! per-request key headers, error classification, and bounded
//! exponential backoff on rate limiting.

use std::time::Duration;

use packshot_core::PackshotError;
use rand::Rng;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Base URL of the Gemini models collection.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Backoff schedule for rate-limited calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Cap on the exponent in `base_delay * 2^attempt`.
    pub max_exponent: u32,
    /// Upper bound of the uniform random jitter added to each delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
            max_exponent: 3,
            jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based), without jitter.
    pub fn base_delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.min(self.max_exponent);
        self.base_delay.saturating_mul(1u32 << exponent.min(31))
    }

    /// Delay before retry number `retry` (0-based), jitter included.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base_delay_for(retry) + Duration::from_millis(jitter)
    }
}

/// HTTP client for Gemini image generation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Creates a client with the given request timeout and retry policy.
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, PackshotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PackshotError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            retry,
        })
    }

    /// Overrides the base URL (configuration and wiremock tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{model}:generateContent", self.base_url)
    }

    /// Sends one logical generation request.
    ///
    /// Rate-limited responses are retried up to `max_retries` times with
    /// exponential backoff; when they keep coming the call fails with
    /// [`PackshotError::QuotaExhausted`]. Every other failure is returned
    /// on first sight.
    pub async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, PackshotError> {
        let url = self.endpoint(model);
        let mut last_quota_message = String::new();

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt - 1);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| PackshotError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model, "generation response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| PackshotError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| PackshotError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            match classify_error(status, &body) {
                PackshotError::QuotaExceeded { message } => {
                    last_quota_message = message;
                }
                other => return Err(other),
            }
        }

        Err(PackshotError::QuotaExhausted {
            attempts: self.retry.max_retries + 1,
            message: last_quota_message,
        })
    }
}

/// Maps a non-success response onto the closed error taxonomy.
///
/// Uses the HTTP status, the canonical `error.status`, and
/// `error.details[].reason`; message text is never inspected.
pub fn classify_error(status: StatusCode, body: &str) -> PackshotError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();
    let (message, api_status, reasons) = match &parsed {
        Some(envelope) => (
            format!("Gemini API error ({status}): {}", envelope.error.message),
            envelope.error.status.as_deref().unwrap_or(""),
            envelope
                .error
                .details
                .iter()
                .filter_map(|d| d.reason.as_deref())
                .collect::<Vec<_>>(),
        ),
        None => (format!("API returned {status}: {body}"), "", Vec::new()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return PackshotError::QuotaExceeded { message };
    }

    let key_rejected = matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    ) || matches!(
        api_status,
        "NOT_FOUND" | "UNAUTHENTICATED" | "PERMISSION_DENIED"
    ) || reasons
        .iter()
        .any(|r| matches!(*r, "API_KEY_INVALID" | "API_KEY_EXPIRED"));
    if key_rejected {
        return PackshotError::InvalidKey { message };
    }

    PackshotError::provider(message)
}
