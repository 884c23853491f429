// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini image provider adapter for Packshot.
//!
//! This crate implements [`ImageProvider`] for the Gemini `generateContent`
//! API. Requests are resolved from a [`GenerationRequest`], errors are
//! classified into the closed Packshot taxonomy, and rate limiting is
//! absorbed by bounded exponential backoff inside [`GeminiClient`].

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use packshot_config::model::ProviderConfig;
use packshot_core::error::PackshotError;
use packshot_core::traits::{ImageProvider, PluginAdapter};
use packshot_core::types::{AdapterType, GeneratedImage, GenerationRequest, HealthStatus};
use tracing::{debug, info};

pub use crate::client::{GeminiClient, RetryPolicy};
use crate::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    RequestContent, TextPart,
};

/// Gemini provider implementing [`ImageProvider`].
///
/// API key resolution order: the request's key, then the environment
/// variable named by `provider.api_key_env`, then [`PackshotError::InvalidKey`].
pub struct GeminiProvider {
    client: GeminiClient,
    default_key: Option<String>,
}

impl GeminiProvider {
    /// Creates a provider from configuration, reading the fallback key
    /// from the configured environment variable.
    pub fn new(config: &ProviderConfig) -> Result<Self, PackshotError> {
        let default_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        let provider = Self::with_default_key(config, default_key)?;
        info!(
            base_url = config.base_url,
            max_retries = config.max_retries,
            env_key = provider.default_key.is_some(),
            "Gemini provider initialized"
        );
        Ok(provider)
    }

    /// Creates a provider with an explicit fallback key.
    pub fn with_default_key(
        config: &ProviderConfig,
        default_key: Option<String>,
    ) -> Result<Self, PackshotError> {
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_exponent: config.max_backoff_exponent,
            jitter: Duration::from_millis(config.jitter_ms),
        };
        let client = GeminiClient::new(Duration::from_secs(config.timeout_secs), retry)?
            .with_base_url(config.base_url.clone());
        Ok(Self {
            client,
            default_key,
        })
    }

    fn resolve_key(&self, request: &GenerationRequest) -> Result<String, PackshotError> {
        request
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or(self.default_key.as_deref())
            .map(str::to_string)
            .ok_or_else(|| PackshotError::InvalidKey {
                message: "no API key configured; set generation.api_key or the provider key environment variable".into(),
            })
    }
}

/// Converts a [`GenerationRequest`] to the Gemini wire format.
///
/// The resolution tier is only transmitted for models that honor it.
pub fn to_wire_request(request: &GenerationRequest) -> GenerateContentRequest {
    let image_size = request
        .model
        .supports_resolution()
        .then(|| request.resolution.to_string());

    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![TextPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE".into()],
            image_config: ImageConfig {
                aspect_ratio: request.aspect_ratio.to_string(),
                image_size,
            },
            seed: request.seed,
        },
    }
}

/// Pulls the first inline image out of a response.
fn extract_image(response: GenerateContentResponse) -> Result<GeneratedImage, PackshotError> {
    let candidate = response.candidates.into_iter().next();
    let finish_reason = candidate
        .as_ref()
        .and_then(|c| c.finish_reason.clone())
        .or_else(|| response.prompt_feedback.and_then(|f| f.block_reason))
        .unwrap_or_else(|| "none".into());

    let inline = candidate
        .and_then(|c| c.content)
        .into_iter()
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data);

    let Some(inline) = inline else {
        return Err(PackshotError::provider(format!(
            "no image returned from Gemini (finish reason: {finish_reason})"
        )));
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| PackshotError::decode(format!("invalid inline image payload: {e}")))?;
    Ok(GeneratedImage {
        mime_type: inline.mime_type,
        bytes,
    })
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PackshotError> {
        // Generation calls are billed, so no probe request is sent.
        if self.default_key.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(
                "no environment API key; requests must carry their own".into(),
            ))
        }
    }

    async fn shutdown(&self) -> Result<(), PackshotError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage, PackshotError> {
        let api_key = self.resolve_key(&request)?;
        let model = request.model.model_id();
        let wire = to_wire_request(&request);
        debug!(
            model,
            aspect_ratio = %request.aspect_ratio,
            seed = ?request.seed,
            "dispatching generation request"
        );
        let response = self.client.generate_content(model, &api_key, &wire).await?;
        extract_image(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packshot_core::GenerationErrorKind;
    use packshot_core::types::{AspectRatio, ImageModel, ResolutionTier};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const FAST_PATH: &str = "/gemini-2.5-flash-image:generateContent";
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn test_provider(base_url: &str, default_key: Option<&str>) -> GeminiProvider {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            backoff_base_ms: 1,
            jitter_ms: 0,
            ..ProviderConfig::default()
        };
        GeminiProvider::with_default_key(&config, default_key.map(str::to_string))
            .expect("provider builds")
    }

    fn request(model: ImageModel) -> GenerationRequest {
        GenerationRequest {
            prompt: "Pizza box on wood table. Emboss logo on lid".into(),
            model,
            aspect_ratio: AspectRatio::Landscape4x3,
            resolution: ResolutionTier::FourK,
            seed: Some(7),
            api_key: Some("request-key".into()),
        }
    }

    fn image_body() -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "mockup"},
                    {"inlineData": {"mimeType": "image/png", "data": PNG_B64}}
                ]},
                "finishReason": "STOP"
            }]
        })
    }

    fn quota_body() -> serde_json::Value {
        json!({"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}})
    }

    #[tokio::test]
    async fn generate_success_returns_decoded_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .and(header("x-goog-api-key", "request-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let image = provider.generate(request(ImageModel::Fast)).await.expect("image");
        assert_eq!(image.mime_type, "image/png");
        assert!(image.bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn fast_model_omits_image_size() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "Pizza box on wood table. Emboss logo on lid"}]}],
                "generationConfig": {"imageConfig": {"aspectRatio": "4:3"}, "seed": 7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        provider.generate(request(ImageModel::Fast)).await.expect("image");

        let received: Vec<Request> = server.received_requests().await.expect("recorded");
        let body: serde_json::Value = received[0].body_json().expect("json body");
        assert!(body["generationConfig"]["imageConfig"].get("imageSize").is_none());
    }

    #[tokio::test]
    async fn premium_model_sends_image_size() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-3-pro-image-preview:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"imageConfig": {"aspectRatio": "4:3", "imageSize": "4K"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        provider.generate(request(ImageModel::Premium)).await.expect("image");
    }

    #[tokio::test]
    async fn three_rate_limits_then_success_is_transparent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(quota_body()))
            .up_to_n_times(3)
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let image = provider.generate(request(ImageModel::Fast)).await;
        assert!(image.is_ok(), "retries should be transparent: {image:?}");
    }

    #[tokio::test]
    async fn four_rate_limits_exhaust_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(quota_body()))
            .expect(4)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let err = provider
            .generate(request(ImageModel::Fast))
            .await
            .expect_err("quota should be exhausted");
        assert!(
            matches!(err, PackshotError::QuotaExhausted { attempts: 4, .. }),
            "got: {err:?}"
        );
        assert!(err.kind().halts_automation());
    }

    #[tokio::test]
    async fn not_found_is_invalid_key_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let err = provider.generate(request(ImageModel::Fast)).await.expect_err("invalid");
        assert_eq!(err.kind(), GenerationErrorKind::InvalidKey);
    }

    #[tokio::test]
    async fn api_key_invalid_reason_is_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.",
                          "status": "INVALID_ARGUMENT",
                          "details": [{"reason": "API_KEY_INVALID"}]}
            })))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let err = provider.generate(request(ImageModel::Fast)).await.expect_err("invalid");
        assert!(matches!(err, PackshotError::InvalidKey { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn server_error_is_unknown_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"code": 500, "message": "Internal error encountered.", "status": "INTERNAL"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let err = provider.generate(request(ImageModel::Fast)).await.expect_err("500");
        assert_eq!(err.kind(), GenerationErrorKind::Unknown);
        assert!(err.to_string().contains("Internal error encountered."), "got: {err}");
    }

    #[tokio::test]
    async fn response_without_image_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]},
                                "finishReason": "IMAGE_SAFETY"}]
            })))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let err = provider.generate(request(ImageModel::Fast)).await.expect_err("no image");
        assert!(matches!(err, PackshotError::Provider { .. }));
        assert!(err.to_string().contains("IMAGE_SAFETY"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_key_without_fallback_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .expect(0)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), None);
        let mut req = request(ImageModel::Fast);
        req.api_key = Some("   ".into());
        let err = provider.generate(req).await.expect_err("no key");
        assert_eq!(err.kind(), GenerationErrorKind::InvalidKey);
    }

    #[tokio::test]
    async fn missing_request_key_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAST_PATH))
            .and(header("x-goog-api-key", "env-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri(), Some("env-key"));
        let mut req = request(ImageModel::Fast);
        req.api_key = None;
        provider.generate(req).await.expect("fallback key works");
    }

    #[tokio::test]
    async fn health_reflects_fallback_key() {
        let healthy = test_provider("http://localhost", Some("k"));
        assert_eq!(healthy.health_check().await.expect("health"), HealthStatus::Healthy);
        let degraded = test_provider("http://localhost", None);
        assert!(matches!(
            degraded.health_check().await.expect("health"),
            HealthStatus::Degraded(_)
        ));
    }
}
