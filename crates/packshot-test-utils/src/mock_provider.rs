// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock image provider for deterministic testing.
//!
//! `MockProvider` implements `ImageProvider` with pre-configured outcomes,
//! records every request it receives, and tracks how many calls were in
//! flight at once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use packshot_core::PackshotError;
use packshot_core::traits::{ImageProvider, PluginAdapter};
use packshot_core::types::{AdapterType, GeneratedImage, GenerationRequest, HealthStatus};

use crate::fixtures::solid_png;

type Outcome = Result<GeneratedImage, PackshotError>;

/// A mock provider that returns scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a
/// 64x64 light-gray PNG is returned.
pub struct MockProvider {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty outcome queue.
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Holds every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The image returned when no outcome is queued.
    pub fn default_image() -> GeneratedImage {
        GeneratedImage {
            mime_type: "image/png".to_string(),
            bytes: solid_png(64, 64, [235, 235, 235, 255]),
        }
    }

    pub async fn push_outcome(&self, outcome: Outcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn push_error(&self, error: PackshotError) {
        self.push_outcome(Err(error)).await;
    }

    /// Every request received, in call order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Highest number of concurrent `generate` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PackshotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PackshotError> {
        Ok(())
    }
}

#[async_trait]
impl ImageProvider for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage, PackshotError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Self::default_image()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packshot_core::types::GenerationSettings;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::from_settings(prompt, &GenerationSettings::default())
    }

    #[tokio::test]
    async fn default_image_when_queue_empty() {
        let provider = MockProvider::new();
        let image = provider.generate(request("a")).await.unwrap();
        assert_eq!(image, MockProvider::default_image());
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn queued_outcomes_returned_in_order() {
        let provider = MockProvider::with_outcomes(vec![
            Err(PackshotError::provider("first")),
            Ok(MockProvider::default_image()),
        ]);
        assert!(provider.generate(request("a")).await.is_err());
        assert!(provider.generate(request("b")).await.is_ok());

        let prompts: Vec<String> = provider
            .requests()
            .await
            .into_iter()
            .map(|r| r.prompt)
            .collect();
        assert_eq!(prompts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn sequential_calls_never_overlap() {
        let provider = MockProvider::new();
        provider.generate(request("a")).await.unwrap();
        provider.generate(request("b")).await.unwrap();
        assert_eq!(provider.max_in_flight(), 1);
    }
}
