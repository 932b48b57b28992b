//! Anomaly descriptors shared by the detector and the scorer.
//!
//! Detection and scoring couple through `AnomalyKind`, never through the
//! display text; the strings below exist only for end users and can be
//! reworded without touching the weight lookup.

use std::fmt;

use serde::{Serialize, Serializer};

/// Category of one detected deviation from the reference profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    RequiredTextMissing,
    SignificantColorMismatch,
    SlightColorMismatch,
    ColorsUndetected,
    NoExpectedFeatures,
    FewExpectedFeatures,
    IllegibleText,
    /// Reserved: no current check emits this, but the scorer weighs it if a
    /// future (or external) check does.
    MissingSecuritySeal,
    /// Escape hatch for anomalies injected from outside the four checks.
    Other,
}

/// One detected deviation, with an optional detail for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub detail: Option<String>,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: AnomalyKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn required_text_missing(text: impl Into<String>) -> Self {
        Self::with_detail(AnomalyKind::RequiredTextMissing, text)
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AnomalyKind::RequiredTextMissing => write!(
                f,
                "required text not found: '{}'",
                self.detail.as_deref().unwrap_or("")
            ),
            AnomalyKind::SignificantColorMismatch => {
                write!(f, "significant color inconsistencies")
            }
            AnomalyKind::SlightColorMismatch => write!(f, "slight color inconsistencies"),
            AnomalyKind::ColorsUndetected => write!(f, "colors could not be detected"),
            AnomalyKind::NoExpectedFeatures => {
                write!(f, "no expected product features detected")
            }
            AnomalyKind::FewExpectedFeatures => write!(f, "few product features detected"),
            AnomalyKind::IllegibleText => write!(f, "label text unclear or illegible"),
            AnomalyKind::MissingSecuritySeal => write!(f, "security seal not detected"),
            AnomalyKind::Other => write!(
                f,
                "{}",
                self.detail.as_deref().unwrap_or("unspecified anomaly")
            ),
        }
    }
}

// Anomalies are surfaced to end users verbatim, so they serialize as their
// display strings.
impl Serialize for Anomaly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_match_the_user_facing_phrasing() {
        assert_eq!(
            Anomaly::required_text_missing("BAYER").to_string(),
            "required text not found: 'BAYER'"
        );
        assert_eq!(
            Anomaly::new(AnomalyKind::SignificantColorMismatch).to_string(),
            "significant color inconsistencies"
        );
        assert_eq!(
            Anomaly::new(AnomalyKind::ColorsUndetected).to_string(),
            "colors could not be detected"
        );
        assert_eq!(
            Anomaly::new(AnomalyKind::IllegibleText).to_string(),
            "label text unclear or illegible"
        );
    }

    #[test]
    fn anomalies_serialize_as_display_strings() {
        let json = serde_json::to_string(&vec![
            Anomaly::new(AnomalyKind::NoExpectedFeatures),
            Anomaly::required_text_missing("RON"),
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"["no expected product features detected","required text not found: 'RON'"]"#
        );
    }
}
