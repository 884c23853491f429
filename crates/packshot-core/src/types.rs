// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Packshot workspace.

use base64::Engine;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PackshotError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

// --- Work items ---

/// Lifecycle state of a [`WorkItem`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Generating,
    Completed,
    Failed,
    Skipped,
}

/// Scheduling hint carried in item metadata.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Descriptive metadata attached to a work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemMetadata {
    pub dimensions: String,
    pub style: String,
    /// Expected generation time in seconds.
    pub estimated_time: u32,
    pub priority: Priority,
}

impl Default for ItemMetadata {
    fn default() -> Self {
        Self {
            dimensions: "1024x1024".to_string(),
            style: "professional".to_string(),
            estimated_time: 45,
            priority: Priority::Medium,
        }
    }
}

/// One unit of mockup-generation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    /// Category id. Dangling references are tolerated.
    pub category: String,
    pub name: String,
    pub prompt: String,
    #[serde(default)]
    pub logo_prompt: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_image: Option<DataUri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: ItemMetadata,
    #[serde(default)]
    pub selected: bool,
}

impl WorkItem {
    /// Creates a pending, unselected item.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            name: name.into(),
            prompt: prompt.into(),
            logo_prompt: String::new(),
            description: String::new(),
            status: ItemStatus::Pending,
            result_image: None,
            error: None,
            metadata: ItemMetadata::default(),
            selected: false,
        }
    }

    /// Sets the logo-integration fragment.
    pub fn with_logo_prompt(mut self, logo_prompt: impl Into<String>) -> Self {
        self.logo_prompt = logo_prompt.into();
        self
    }

    /// Joins the base prompt and the logo fragment with a sentence boundary.
    pub fn final_prompt(&self) -> String {
        let base = self.prompt.trim();
        let logo = self.logo_prompt.trim();
        if logo.is_empty() {
            return base.to_string();
        }
        if base.is_empty() {
            return logo.to_string();
        }
        if base.ends_with(['.', '!', '?']) {
            format!("{base} {logo}")
        } else {
            format!("{base}. {logo}")
        }
    }

    pub fn mark_generating(&mut self) {
        self.status = ItemStatus::Generating;
        self.error = None;
    }

    pub fn mark_completed(&mut self, image: DataUri) {
        self.status = ItemStatus::Completed;
        self.result_image = Some(image);
        self.error = None;
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = ItemStatus::Failed;
        self.result_image = None;
        self.error = Some(message.into());
    }

    /// Returns the item to `Pending`, dropping any result and error.
    pub fn reset(&mut self) {
        self.status = ItemStatus::Pending;
        self.result_image = None;
        self.error = None;
    }
}

/// Cosmetic grouping of work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

// --- Encoded images ---

/// An encoded raster carried as a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUri(String);

impl DataUri {
    /// Encodes raw bytes with the given MIME type.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    /// Wraps an already-encoded URI after checking its shape.
    pub fn parse(uri: impl Into<String>) -> Result<Self, PackshotError> {
        let uri = uri.into();
        split_data_uri(&uri)?;
        Ok(Self(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the MIME type declared in the URI header.
    pub fn mime_type(&self) -> &str {
        split_data_uri(&self.0).map(|(mime, _)| mime).unwrap_or("")
    }

    /// Decodes the base64 payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PackshotError> {
        let (_, payload) = split_data_uri(&self.0)?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| PackshotError::decode(format!("invalid base64 payload: {e}")))
    }
}

fn split_data_uri(uri: &str) -> Result<(&str, &str), PackshotError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PackshotError::decode("not a data URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| PackshotError::decode("data URI is not base64 encoded"))?;
    Ok((mime, payload))
}

// --- Logo effects ---

/// One of nine placement slots on a 3x3 grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

/// Pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub color: String,
    pub blur: f32,
    pub offset: Offset,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            blur: 5.0,
            offset: Offset { x: 2.0, y: 2.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BorderConfig {
    pub enabled: bool,
    pub color: String,
    pub width: f32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#ffffff".to_string(),
            width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GlowConfig {
    pub enabled: bool,
    pub color: String,
    pub strength: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#ffffff".to_string(),
            strength: 10.0,
        }
    }
}

/// Transform and effect parameters for the logo overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LogoEffectConfig {
    /// Logo width as a percentage of the shorter base edge.
    pub size: f32,
    /// 0 to 100.
    pub opacity: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub position: Anchor,
    pub shadow: ShadowConfig,
    pub border: BorderConfig,
    pub glow: GlowConfig,
}

impl LogoEffectConfig {
    pub const MIN_SIZE: f32 = 5.0;
    pub const MAX_SIZE: f32 = 45.0;
}

impl Default for LogoEffectConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            opacity: 100.0,
            rotation: 0.0,
            position: Anchor::BottomRight,
            shadow: ShadowConfig::default(),
            border: BorderConfig::default(),
            glow: GlowConfig::default(),
        }
    }
}

// --- Generation settings ---

/// Image model tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageModel {
    #[default]
    Fast,
    Premium,
}

impl ImageModel {
    /// Provider model identifier.
    pub fn model_id(self) -> &'static str {
        match self {
            Self::Fast => "gemini-2.5-flash-image",
            Self::Premium => "gemini-3-pro-image-preview",
        }
    }

    /// Whether the resolution tier is transmitted for this model.
    pub fn supports_resolution(self) -> bool {
        matches!(self, Self::Premium)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    #[strum(serialize = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    #[strum(serialize = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape16x9,
}

/// Coarse output size selector, honored by the premium model only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum ResolutionTier {
    #[default]
    #[serde(rename = "1K")]
    #[strum(serialize = "1K")]
    OneK,
    #[serde(rename = "2K")]
    #[strum(serialize = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    #[strum(serialize = "4K")]
    FourK,
}

/// Whether automation re-dispatches `Failed` items within a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FailedItemPolicy {
    #[default]
    Retry,
    Manual,
}

/// User-facing generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GenerationSettings {
    pub model: ImageModel,
    pub aspect_ratio: AspectRatio,
    pub resolution: ResolutionTier,
    pub seed: Option<i64>,
    /// Pause between automation cycles.
    pub delay_ms: u64,
    /// Empty falls back to the provider's environment key.
    pub api_key: String,
    pub pause_on_error: bool,
    pub failed_items: FailedItemPolicy,
    /// Dispatches allowed per item within a single automation run.
    pub max_attempts_per_run: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: ImageModel::Fast,
            aspect_ratio: AspectRatio::Square,
            resolution: ResolutionTier::OneK,
            seed: None,
            delay_ms: 3000,
            api_key: String::new(),
            pause_on_error: true,
            failed_items: FailedItemPolicy::Retry,
            max_attempts_per_run: 3,
        }
    }
}

/// A fully resolved request to an image provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: ImageModel,
    pub aspect_ratio: AspectRatio,
    pub resolution: ResolutionTier,
    pub seed: Option<i64>,
    /// `None` uses the provider default key.
    pub api_key: Option<String>,
}

impl GenerationRequest {
    /// Builds a request from settings, treating an empty key as absent.
    pub fn from_settings(prompt: impl Into<String>, settings: &GenerationSettings) -> Self {
        let key = settings.api_key.trim();
        Self {
            prompt: prompt.into(),
            model: settings.model,
            aspect_ratio: settings.aspect_ratio,
            resolution: settings.resolution,
            seed: settings.seed,
            api_key: (!key.is_empty()).then(|| key.to_string()),
        }
    }
}

/// One decoded provider result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> DataUri {
        DataUri::from_bytes(&self.mime_type, &self.bytes)
    }
}

/// Well-known document keys in the key-value store.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const CATEGORIES: &str = "categories";
    pub const LOGO_LIBRARY: &str = "logo_library";
    pub const LOGO_EFFECTS: &str = "logo_effects";
    pub const WORK_ITEMS: &str = "work_items";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_prompt_joins_with_sentence_boundary() {
        let item = WorkItem::new("pizza-001", "pizza", "Pizza", "Pizza box on wood table")
            .with_logo_prompt("Emboss logo on lid");
        assert_eq!(item.final_prompt(), "Pizza box on wood table. Emboss logo on lid");
    }

    #[test]
    fn final_prompt_without_logo_fragment_is_trimmed_base() {
        let item = WorkItem::new("a", "pizza", "A", "  studio shot.  ");
        assert_eq!(item.final_prompt(), "studio shot.");

        let item = item.with_logo_prompt("Logo on lid");
        assert_eq!(item.final_prompt(), "studio shot. Logo on lid");
    }

    #[test]
    fn status_transitions_keep_result_invariant() {
        let mut item = WorkItem::new("a", "pizza", "A", "p");
        item.mark_generating();
        assert_eq!(item.status, ItemStatus::Generating);

        item.mark_completed(DataUri::from_bytes("image/png", &[1, 2, 3]));
        assert_eq!(item.status, ItemStatus::Completed);
        assert!(item.result_image.is_some());

        item.mark_failed("boom");
        assert_eq!(item.status, ItemStatus::Failed);
        assert!(item.result_image.is_none());
        assert_eq!(item.error.as_deref(), Some("boom"));

        item.reset();
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.error.is_none());
    }

    #[test]
    fn data_uri_round_trips_bytes() {
        let uri = DataUri::from_bytes("image/png", b"\x89PNG");
        assert!(uri.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.to_bytes().unwrap(), b"\x89PNG");
    }

    #[test]
    fn data_uri_rejects_plain_strings() {
        assert!(DataUri::parse("https://example.com/logo.png").is_err());
        assert!(DataUri::parse("data:image/png,raw").is_err());
    }

    #[test]
    fn enums_use_wire_spellings() {
        assert_eq!(serde_json::to_string(&AspectRatio::Portrait9x16).unwrap(), "\"9:16\"");
        assert_eq!(serde_json::to_string(&ResolutionTier::FourK).unwrap(), "\"4K\"");
        assert_eq!(serde_json::to_string(&Anchor::MiddleCenter).unwrap(), "\"middle-center\"");
        assert_eq!("bottom-right".parse::<Anchor>().unwrap(), Anchor::BottomRight);
        assert_eq!("premium".parse::<ImageModel>().unwrap(), ImageModel::Premium);
        assert_eq!(ItemStatus::Skipped.to_string(), "skipped");
    }

    #[test]
    fn work_item_json_uses_camel_case_and_defaults() {
        let json = r#"{"id":"x","category":"pizza","name":"X","prompt":"p","logoPrompt":"l"}"#;
        let item: WorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.logo_prompt, "l");
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.metadata.estimated_time, 45);
        assert!(!item.selected);
    }

    #[test]
    fn request_treats_blank_key_as_absent() {
        let settings = GenerationSettings {
            api_key: "   ".into(),
            ..GenerationSettings::default()
        };
        assert_eq!(GenerationRequest::from_settings("p", &settings).api_key, None);
    }
}
