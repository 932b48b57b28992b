//! Engine configuration with tunable parameters.
//!
//! Every heuristic constant lives here so deployments can retune detection
//! without touching logic: layered loading goes built-in defaults, then an
//! optional `authentiscan` config file, then `AUTHENTISCAN_*` environment
//! overrides.

use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::error::AppError;

/// Scoring constants for automatic product-type detection.
///
/// These are heuristic values with no statistical grounding; they are kept
/// as named, overridable settings so they can be tuned in deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Points per brand keyword found in the recognized text.
    pub keyword_score: u32,
    /// Points per detected label matching a profile label keyword.
    pub label_score: u32,
    /// A profile must reach this score (and strictly beat every other
    /// candidate) to win; otherwise detection falls back to the default.
    pub min_winning_score: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            keyword_score: 2,
            label_score: 1,
            min_winning_score: 2,
        }
    }
}

/// Thresholds for the anomaly checks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum color similarity for a detected color to count as a match
    /// against an expected profile color.
    pub color_similarity_threshold: f64,
    /// How many of the most dominant detected colors to compare.
    pub top_color_count: usize,
    /// Below this many text annotations the label is considered illegible.
    pub min_text_annotations: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            color_similarity_threshold: 0.7,
            top_color_count: 3,
            min_text_annotations: 2,
        }
    }
}

/// Constants for the probability aggregation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Starting probability before any anomaly is weighed in.
    pub base_probability: i32,
    /// Weight for anomalies without a dedicated entry in the profile table.
    pub default_anomaly_weight: i32,
    /// Penalty when no text was recognized at all.
    pub missing_text_penalty: i32,
    /// Bonus subtracted when enough expected label keywords matched.
    pub feature_match_bonus: i32,
    /// Matches needed to earn the bonus.
    pub feature_match_threshold: usize,
    /// Floor of the reported probability; the engine never asserts
    /// certainty of authenticity.
    pub min_probability: i32,
    /// Ceiling of the reported probability; the engine never asserts
    /// certainty of counterfeiting.
    pub max_probability: i32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            base_probability: 10,
            default_anomaly_weight: 8,
            missing_text_penalty: 15,
            feature_match_bonus: 10,
            feature_match_threshold: 3,
            min_probability: 5,
            max_probability: 95,
        }
    }
}

/// Process-wide engine configuration: the reference catalog plus every
/// tunable constant. Built once at startup, immutable afterwards.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog: ReferenceCatalog,
    pub classifier: ClassifierSettings,
    pub detection: DetectionSettings,
    pub scoring: ScoringSettings,
}

impl EngineConfig {
    /// Load configuration from the optional `authentiscan` file (any
    /// format the config crate recognizes) and `AUTHENTISCAN_*` env vars,
    /// on top of the built-in defaults.
    pub fn load() -> Result<Self, AppError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::with_name("authentiscan").required(false))
            .add_source(
                config::Environment::with_prefix("AUTHENTISCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.catalog.validate().map_err(AppError::InvalidConfig)?;
        if !(0.0..=1.0).contains(&self.detection.color_similarity_threshold) {
            return Err(AppError::InvalidConfig(
                "color similarity threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.top_color_count == 0 {
            return Err(AppError::InvalidConfig(
                "top color count must be greater than 0".to_string(),
            ));
        }
        if self.scoring.min_probability > self.scoring.max_probability {
            return Err(AppError::InvalidConfig(
                "probability floor must not exceed the ceiling".to_string(),
            ));
        }
        if !(0..=255).contains(&self.scoring.min_probability)
            || !(0..=255).contains(&self.scoring.max_probability)
        {
            return Err(AppError::InvalidConfig(
                "probability bounds must fit in 0..=255".to_string(),
            ));
        }
        Ok(())
    }
}
