//! Weighted aggregation of anomalies into a bounded counterfeit
//! probability.
//!
//! The result is a heuristic score, not a calibrated statistical
//! probability. It is clamped on both ends by design: the ceiling caps
//! false certainty of counterfeiting, the floor caps false certainty of
//! authenticity.

use tracing::debug;

use super::anomaly::{Anomaly, AnomalyKind};
use super::detectors::count_label_matches;
use crate::catalog::ProductProfile;
use crate::config::ScoringSettings;
use crate::perception::PerceptionResult;

fn anomaly_weight(kind: AnomalyKind, profile: &ProductProfile, settings: &ScoringSettings) -> i32 {
    let weights = &profile.weights;
    match kind {
        AnomalyKind::RequiredTextMissing => weights.required_text_missing,
        AnomalyKind::SignificantColorMismatch => weights.significant_color_mismatch,
        AnomalyKind::SlightColorMismatch => weights.slight_color_mismatch,
        AnomalyKind::NoExpectedFeatures => weights.no_expected_features,
        AnomalyKind::FewExpectedFeatures => weights.few_expected_features,
        AnomalyKind::IllegibleText => weights.illegible_text,
        AnomalyKind::MissingSecuritySeal => weights.missing_security_seal,
        // Undetected colors and foreign anomalies carry the flat minor
        // weight.
        AnomalyKind::ColorsUndetected | AnomalyKind::Other => settings.default_anomaly_weight,
    }
}

/// Sum base probability, per-anomaly weights and quality adjustments, then
/// clamp to the configured bounds.
pub fn score_probability(
    anomalies: &[Anomaly],
    perception: &PerceptionResult,
    profile: &ProductProfile,
    settings: &ScoringSettings,
) -> u8 {
    let anomaly_increase: i32 = anomalies
        .iter()
        .map(|anomaly| anomaly_weight(anomaly.kind, profile, settings))
        .sum();

    let mut quality_adjustment = 0;

    // No recognized text at all is worse than the illegibility anomaly
    // alone (which already fires below two annotations).
    if perception.text_annotations.is_empty() {
        quality_adjustment += settings.missing_text_penalty;
    }

    // Strong positive signal: many expected product features present.
    let descriptions = perception.label_descriptions_lower();
    let feature_matches = count_label_matches(&descriptions, &profile.expected_labels);
    if feature_matches >= settings.feature_match_threshold {
        quality_adjustment -= settings.feature_match_bonus;
    }

    let total = settings.base_probability + anomaly_increase + quality_adjustment;
    let clamped = total.clamp(settings.min_probability, settings.max_probability);
    debug!(
        brand = %profile.brand_name,
        anomaly_increase,
        quality_adjustment,
        probability = clamped,
        "probability scored"
    );
    clamped as u8
}
