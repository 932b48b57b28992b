//! Classification-and-scoring engine.
//!
//! Pure computation over an already-fetched [`PerceptionResult`]: resolve
//! the product type, run the anomaly checks, aggregate the probability.
//! The engine holds only an `Arc` to its immutable configuration, so it is
//! cheap to clone and safe to share across concurrent requests.

pub mod anomaly;
pub mod classifier;
pub mod detectors;
pub mod scoring;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AppError, EngineError};
use crate::perception::PerceptionResult;
use self::anomaly::Anomaly;

/// Condensed perception data echoed back with every report.
#[derive(Debug, Clone, Serialize)]
pub struct PerceptionSummary {
    pub text_found: bool,
    /// Up to the five strongest labels, provider order.
    pub labels_found: Vec<String>,
    /// Up to the three most dominant colors as hex.
    pub dominant_colors: Vec<String>,
}

impl PerceptionSummary {
    fn from_perception(perception: &PerceptionResult) -> Self {
        Self {
            text_found: perception.has_text(),
            labels_found: perception
                .labels
                .iter()
                .take(5)
                .map(|l| l.description.clone())
                .collect(),
            dominant_colors: perception
                .colors
                .iter()
                .take(3)
                .map(|c| c.to_hex())
                .collect(),
        }
    }
}

/// Final result handed to the caller for persistence and notification.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Always a valid catalog key.
    pub product_type: String,
    pub brand: String,
    /// Detection findings in presentation order, surfaced to users
    /// verbatim.
    pub anomalies: Vec<Anomaly>,
    /// Counterfeit likelihood in `[min_probability, max_probability]`
    /// (5–95 by default). Downstream risk tiers must stay consistent with
    /// this range.
    pub probability: u8,
    pub summary: PerceptionSummary,
    /// True when the product type was auto-detected rather than declared.
    pub type_inferred: bool,
    /// False when auto-detection fell back to the default profile.
    pub type_conclusive: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// The classification-and-scoring engine.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: Arc<EngineConfig>,
}

impl AnalysisEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Engine over the built-in catalog and default tuning.
    pub fn with_defaults() -> Self {
        Self {
            config: Arc::new(EngineConfig::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify one product.
    ///
    /// With a declared type, an unknown key is a hard
    /// [`EngineError::UnknownProductType`]. Without one the type is
    /// auto-detected and always resolves to a catalog key, falling back to
    /// the default profile on ambiguous signals.
    pub fn analyze(
        &self,
        perception: &PerceptionResult,
        declared_type: Option<&str>,
    ) -> Result<AnalysisReport, EngineError> {
        let config = &self.config;
        let (product_type, type_inferred, type_conclusive) = match declared_type {
            Some(declared) => {
                config.catalog.get(declared)?;
                (declared.to_string(), false, true)
            }
            None => {
                let classification =
                    classifier::classify(perception, &config.catalog, &config.classifier);
                if !classification.conclusive {
                    warn!(
                        fallback = %classification.product_type,
                        score = classification.score,
                        "product type detection inconclusive, using default profile"
                    );
                }
                (
                    classification.product_type,
                    true,
                    classification.conclusive,
                )
            }
        };

        // Auto-detection always resolves to a catalog key, so this lookup
        // only fails for a declared type, which was already checked above.
        let profile = config.catalog.get(&product_type)?;

        let anomalies = detectors::detect_anomalies(perception, profile, &config.detection);
        let probability =
            scoring::score_probability(&anomalies, perception, profile, &config.scoring);

        info!(
            product_type,
            probability,
            anomaly_count = anomalies.len(),
            "analysis completed"
        );

        Ok(AnalysisReport {
            product_type,
            brand: profile.brand_name.clone(),
            anomalies,
            probability,
            summary: PerceptionSummary::from_perception(perception),
            type_inferred,
            type_conclusive,
            analyzed_at: Utc::now(),
        })
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
