//! The four anomaly checks run against a resolved product profile.
//!
//! Each check is pure and independent; all four always run and their
//! findings are concatenated in check order (text, color, label, quality).
//! A check degrades into an anomaly rather than an error when its input is
//! sparse — an empty color list is a finding, not a failure.

use tracing::debug;

use super::anomaly::{Anomaly, AnomalyKind};
use crate::catalog::ProductProfile;
use crate::config::DetectionSettings;
use crate::perception::{color, PerceptionResult};

/// Run every check and collect the findings in presentation order.
pub fn detect_anomalies(
    perception: &PerceptionResult,
    profile: &ProductProfile,
    settings: &DetectionSettings,
) -> Vec<Anomaly> {
    let mut anomalies = check_required_text(perception, profile);
    anomalies.extend(check_colors(perception, profile, settings));
    anomalies.extend(check_labels(perception, profile));
    anomalies.extend(check_legibility(perception, settings));
    debug!(
        brand = %profile.brand_name,
        count = anomalies.len(),
        "anomaly detection finished"
    );
    anomalies
}

/// One anomaly per required text entry absent from the recognized text.
/// Case-insensitive exact substring match, no fuzzy matching.
fn check_required_text(perception: &PerceptionResult, profile: &ProductProfile) -> Vec<Anomaly> {
    let blob = perception.text_blob_upper();
    profile
        .required_text
        .iter()
        .filter(|required| !blob.contains(&required.to_uppercase()))
        .map(|required| Anomaly::required_text_missing(required.clone()))
        .collect()
}

/// Compare the most dominant detected colors against the profile palette.
///
/// An expected color "matches" when any of the top detected colors is at
/// least `color_similarity_threshold` similar to it. Zero matches across
/// the palette is a significant inconsistency, exactly one is slight.
fn check_colors(
    perception: &PerceptionResult,
    profile: &ProductProfile,
    settings: &DetectionSettings,
) -> Vec<Anomaly> {
    if perception.colors.is_empty() {
        return vec![Anomaly::new(AnomalyKind::ColorsUndetected)];
    }

    let detected_hex: Vec<String> = perception
        .colors
        .iter()
        .take(settings.top_color_count)
        .map(|sample| sample.to_hex())
        .collect();

    let matches = profile
        .expected_colors
        .iter()
        .filter(|expected| {
            detected_hex.iter().any(|detected| {
                // Expected colors are validated at startup and detected hex
                // is generated, so a parse failure just fails the match.
                color::similarity(expected, detected)
                    .map(|s| s >= settings.color_similarity_threshold)
                    .unwrap_or(false)
            })
        })
        .count();

    match matches {
        0 => vec![Anomaly::new(AnomalyKind::SignificantColorMismatch)],
        1 => vec![Anomaly::new(AnomalyKind::SlightColorMismatch)],
        _ => Vec::new(),
    }
}

/// Count expected label keywords seen in the detected labels.
fn check_labels(perception: &PerceptionResult, profile: &ProductProfile) -> Vec<Anomaly> {
    let descriptions = perception.label_descriptions_lower();
    match count_label_matches(&descriptions, &profile.expected_labels) {
        0 => vec![Anomaly::new(AnomalyKind::NoExpectedFeatures)],
        1 => vec![Anomaly::new(AnomalyKind::FewExpectedFeatures)],
        _ => Vec::new(),
    }
}

/// Too few text annotations means the label cannot be verified at all. A
/// single annotation (just the full-page blob, no tokenized words) still
/// counts as insufficient.
fn check_legibility(perception: &PerceptionResult, settings: &DetectionSettings) -> Vec<Anomaly> {
    if perception.text_annotations.len() < settings.min_text_annotations {
        vec![Anomaly::new(AnomalyKind::IllegibleText)]
    } else {
        Vec::new()
    }
}

/// How many expected label keywords appear as a substring of any detected
/// label description. Shared with the scorer's feature-match bonus.
pub fn count_label_matches(descriptions_lower: &[String], expected_labels: &[String]) -> usize {
    expected_labels
        .iter()
        .filter(|expected| {
            descriptions_lower
                .iter()
                .any(|description| description.contains(expected.as_str()))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceCatalog;
    use crate::perception::{ColorSample, LabelAnnotation, TextAnnotation};

    fn bayer_profile() -> ProductProfile {
        ReferenceCatalog::builtin().get("bayer").unwrap().clone()
    }

    fn text(t: &str) -> TextAnnotation {
        TextAnnotation {
            text: t.to_string(),
            confidence: 0.9,
        }
    }

    fn label(description: &str) -> LabelAnnotation {
        LabelAnnotation {
            description: description.to_string(),
            score: 0.8,
        }
    }

    fn sample(red: f32, green: f32, blue: f32) -> ColorSample {
        ColorSample {
            red,
            green,
            blue,
            score: 0.5,
            pixel_fraction: 0.2,
        }
    }

    fn authentic_bayer_perception() -> PerceptionResult {
        PerceptionResult {
            text_annotations: vec![
                text("BAYER ASPIRINA REGISTRO SANITARIO LABORATORIO FABRICANTE"),
                text("BAYER"),
                text("ASPIRINA"),
            ],
            labels: vec![label("medicine"), label("pill bottle"), label("tablet")],
            colors: vec![
                sample(1.0, 1.0, 1.0),
                sample(1.0, 0.0, 0.0),
                sample(0.0, 0.2, 0.63),
            ],
        }
    }

    #[test]
    fn authentic_perception_yields_no_anomalies() {
        let anomalies = detect_anomalies(
            &authentic_bayer_perception(),
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies.is_empty(), "unexpected anomalies: {anomalies:?}");
    }

    #[test]
    fn every_missing_required_text_is_reported() {
        let perception = PerceptionResult {
            text_annotations: vec![text("BAYER ASPIRINA"), text("BAYER")],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        let missing: Vec<_> = anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::RequiredTextMissing)
            .collect();
        assert_eq!(missing.len(), 4); // REGISTRO, SANITARIO, LABORATORIO, FABRICANTE
        assert_eq!(
            missing[0].to_string(),
            "required text not found: 'REGISTRO'"
        );
    }

    #[test]
    fn text_matching_is_case_insensitive() {
        let perception = PerceptionResult {
            text_annotations: vec![
                text("bayer aspirina registro sanitario laboratorio fabricante"),
                text("bayer"),
            ],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies
            .iter()
            .all(|a| a.kind != AnomalyKind::RequiredTextMissing));
    }

    #[test]
    fn empty_colors_emit_only_the_undetected_anomaly() {
        let perception = PerceptionResult {
            colors: Vec::new(),
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        let color_kinds: Vec<_> = anomalies
            .iter()
            .filter(|a| {
                matches!(
                    a.kind,
                    AnomalyKind::ColorsUndetected
                        | AnomalyKind::SignificantColorMismatch
                        | AnomalyKind::SlightColorMismatch
                )
            })
            .collect();
        assert_eq!(color_kinds.len(), 1);
        assert_eq!(color_kinds[0].kind, AnomalyKind::ColorsUndetected);
    }

    #[test]
    fn one_palette_match_is_a_slight_mismatch() {
        // Only white matches; red and blue are absent.
        let perception = PerceptionResult {
            colors: vec![sample(1.0, 1.0, 1.0), sample(0.2, 0.8, 0.2)],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::SlightColorMismatch));
    }

    #[test]
    fn zero_palette_matches_is_a_significant_mismatch() {
        let perception = PerceptionResult {
            colors: vec![sample(0.1, 0.5, 0.1), sample(0.2, 0.6, 0.2)],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::SignificantColorMismatch));
    }

    #[test]
    fn only_top_colors_participate_in_matching() {
        // White is the fourth most dominant color, below top_color_count.
        let perception = PerceptionResult {
            colors: vec![
                sample(0.1, 0.5, 0.1),
                sample(0.2, 0.6, 0.2),
                sample(0.3, 0.7, 0.3),
                sample(1.0, 1.0, 1.0),
            ],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::SignificantColorMismatch));
    }

    #[test]
    fn label_keyword_matches_are_substring_based() {
        // "pill bottle" matches both "pill" and "bottle".
        let descriptions = vec!["pill bottle".to_string()];
        let expected = vec!["pill".to_string(), "bottle".to_string(), "drug".to_string()];
        assert_eq!(count_label_matches(&descriptions, &expected), 2);
    }

    #[test]
    fn absent_product_features_are_reported_by_count() {
        let none = PerceptionResult {
            labels: vec![label("landscape"), label("tree")],
            ..authentic_bayer_perception()
        };
        let few = PerceptionResult {
            labels: vec![label("medicine"), label("tree")],
            ..authentic_bayer_perception()
        };
        let profile = bayer_profile();
        let settings = DetectionSettings::default();
        assert!(detect_anomalies(&none, &profile, &settings)
            .iter()
            .any(|a| a.kind == AnomalyKind::NoExpectedFeatures));
        assert!(detect_anomalies(&few, &profile, &settings)
            .iter()
            .any(|a| a.kind == AnomalyKind::FewExpectedFeatures));
    }

    #[test]
    fn single_annotation_counts_as_illegible() {
        let perception = PerceptionResult {
            text_annotations: vec![text(
                "BAYER ASPIRINA REGISTRO SANITARIO LABORATORIO FABRICANTE",
            )],
            ..authentic_bayer_perception()
        };
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::IllegibleText));
    }

    #[test]
    fn checks_never_short_circuit_each_other() {
        let perception = PerceptionResult::default();
        let anomalies = detect_anomalies(
            &perception,
            &bayer_profile(),
            &DetectionSettings::default(),
        );
        // All six required texts missing, colors undetected, no features,
        // illegible text: every channel reports.
        assert_eq!(
            anomalies
                .iter()
                .filter(|a| a.kind == AnomalyKind::RequiredTextMissing)
                .count(),
            6
        );
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::ColorsUndetected));
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::NoExpectedFeatures));
        assert!(anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::IllegibleText));
    }
}
