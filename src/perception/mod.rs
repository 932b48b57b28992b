//! Structured output of the external vision/OCR collaborator.
//!
//! The engine never touches pixels; it consumes the provider's annotations
//! as-is. Absent lists deserialize as empty so a sparse payload degrades
//! into anomalies instead of failing (only structurally invalid JSON is an
//! error).

pub mod color;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One recognized text region. By provider convention the first annotation
/// is the full-page text blob and later entries are individual tokens; the
/// engine only does substring checks, so the duplication is harmless.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextAnnotation {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

/// One object/scene label, scored in `[0, 1]`, ordered by descending score.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: f32,
}

/// One dominant-color sample, ordered by descending dominance.
///
/// Channels may be unit-range floats or 8-bit values depending on the
/// provider; `to_hex` handles both.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorSample {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub pixel_fraction: f32,
}

impl ColorSample {
    pub fn to_hex(&self) -> String {
        color::to_hex(self.red, self.green, self.blue)
    }
}

/// Everything the vision collaborator reports for one image.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerceptionResult {
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    pub labels: Vec<LabelAnnotation>,
    #[serde(default)]
    pub colors: Vec<ColorSample>,
}

impl PerceptionResult {
    pub fn from_json(payload: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn has_text(&self) -> bool {
        !self.text_annotations.is_empty()
    }

    /// All recognized text joined into one uppercase blob for substring
    /// matching.
    pub fn text_blob_upper(&self) -> String {
        self.text_annotations
            .iter()
            .map(|t| t.text.to_uppercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lowercased label descriptions, provider order preserved.
    pub fn label_descriptions_lower(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.description.to_lowercase())
            .collect()
    }
}
