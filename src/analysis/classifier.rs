//! Automatic product-type detection from recognized text and labels.

use tracing::debug;

use crate::catalog::{ProductProfile, ReferenceCatalog};
use crate::config::ClassifierSettings;
use crate::perception::PerceptionResult;

/// Outcome of automatic type detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClassification {
    pub product_type: String,
    pub score: u32,
    /// False when no candidate won cleanly and the default profile was
    /// used. Not an error: ambiguous or low-signal images are expected.
    pub conclusive: bool,
}

fn score_profile(
    profile: &ProductProfile,
    text_blob: &str,
    label_descriptions: &[String],
    settings: &ClassifierSettings,
) -> u32 {
    let keyword_hits = profile
        .detection_keywords
        .iter()
        .filter(|keyword| text_blob.contains(keyword.to_uppercase().as_str()))
        .count() as u32;

    // Each detected label scores at most once per profile, however many of
    // the profile's keywords it contains.
    let label_hits = label_descriptions
        .iter()
        .filter(|description| {
            profile
                .detection_labels
                .iter()
                .any(|keyword| description.contains(keyword.as_str()))
        })
        .count() as u32;

    keyword_hits * settings.keyword_score + label_hits * settings.label_score
}

/// Score every catalog profile against the perception data and pick the
/// winner.
///
/// A profile wins only with a strictly greatest score of at least
/// `min_winning_score`; ties and weak signals fall back to the catalog's
/// first-registered profile so an ambiguous image is never misclassified
/// with confidence.
///
/// The caller guarantees a validated, non-empty catalog.
pub fn classify(
    perception: &PerceptionResult,
    catalog: &ReferenceCatalog,
    settings: &ClassifierSettings,
) -> TypeClassification {
    let text_blob = perception.text_blob_upper();
    let label_descriptions = perception.label_descriptions_lower();

    let scores: Vec<(&str, u32)> = catalog
        .iter()
        .map(|(product_type, profile)| {
            let score = score_profile(profile, &text_blob, &label_descriptions, settings);
            debug!(product_type, score, "classifier candidate scored");
            (product_type, score)
        })
        .collect();

    let best = scores
        .iter()
        .max_by_key(|(_, score)| *score)
        .copied()
        .expect("catalog validated as non-empty");
    let contenders = scores.iter().filter(|(_, s)| *s == best.1).count();

    if best.1 >= settings.min_winning_score && contenders == 1 {
        TypeClassification {
            product_type: best.0.to_string(),
            score: best.1,
            conclusive: true,
        }
    } else {
        let fallback = catalog
            .default_type()
            .expect("catalog validated as non-empty");
        TypeClassification {
            product_type: fallback.to_string(),
            score: best.1,
            conclusive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{LabelAnnotation, TextAnnotation};

    fn perception_with(texts: &[&str], labels: &[&str]) -> PerceptionResult {
        PerceptionResult {
            text_annotations: texts
                .iter()
                .map(|t| TextAnnotation {
                    text: t.to_string(),
                    confidence: 0.9,
                })
                .collect(),
            labels: labels
                .iter()
                .map(|l| LabelAnnotation {
                    description: l.to_string(),
                    score: 0.8,
                })
                .collect(),
            colors: Vec::new(),
        }
    }

    #[test]
    fn strong_pharma_signals_classify_as_bayer() {
        let perception = perception_with(
            &["BAYER ASPIRINA 500mg", "LABORATORIO"],
            &["medicine", "tablet"],
        );
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        assert_eq!(classification.product_type, "bayer");
        assert!(classification.conclusive);
    }

    #[test]
    fn strong_spirit_signals_classify_as_fla() {
        let perception = perception_with(&["RON FLA ANEJO"], &["liquor", "bottle"]);
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        assert_eq!(classification.product_type, "fla");
        assert!(classification.conclusive);
    }

    #[test]
    fn no_signal_falls_back_to_the_default_profile() {
        let perception = perception_with(&[], &["landscape", "tree"]);
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        assert_eq!(classification.product_type, "bayer");
        assert!(!classification.conclusive);
        assert_eq!(classification.score, 0);
    }

    #[test]
    fn a_tie_is_inconclusive() {
        // One keyword hit for each profile: 2 vs 2.
        let perception = perception_with(&["BAYER FLA"], &[]);
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        assert!(!classification.conclusive);
        assert_eq!(classification.product_type, "bayer");
    }

    #[test]
    fn a_weak_lone_signal_is_below_the_winning_threshold() {
        // A single label hit scores 1, below min_winning_score.
        let perception = perception_with(&[], &["medicine"]);
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        assert!(!classification.conclusive);
    }

    #[test]
    fn label_keywords_match_inside_longer_descriptions() {
        let perception = perception_with(&["ASPIRINA"], &["pill bottle", "medicine cabinet"]);
        let classification = classify(
            &perception,
            &ReferenceCatalog::builtin(),
            &ClassifierSettings::default(),
        );
        // 2 for the keyword + 2 label hits = 4 for bayer.
        // "pill bottle" also scores 1 for fla ("bottle"), not enough.
        assert_eq!(classification.product_type, "bayer");
        assert!(classification.conclusive);
        assert_eq!(classification.score, 4);
    }
}
