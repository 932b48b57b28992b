//! Reference catalog of known product profiles.
//!
//! The catalog is configuration data, not logic: adding a brand is a data
//! change only. It is built once at startup and shared read-only for the
//! process lifetime. Insertion order matters — the first registered profile
//! is the fallback when auto-detection is inconclusive.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::perception::color;

/// Per-profile anomaly weights for the probability scorer.
///
/// The same anomaly carries different consequence per product category:
/// missing required text matters more for regulated pharmaceuticals than
/// for spirits, while color fidelity matters more for branded bottles.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnomalyWeights {
    pub required_text_missing: i32,
    pub significant_color_mismatch: i32,
    pub slight_color_mismatch: i32,
    pub no_expected_features: i32,
    pub few_expected_features: i32,
    pub illegible_text: i32,
    pub missing_security_seal: i32,
}

impl Default for AnomalyWeights {
    fn default() -> Self {
        Self {
            required_text_missing: 25,
            significant_color_mismatch: 25,
            slight_color_mismatch: 15,
            no_expected_features: 30,
            few_expected_features: 15,
            illegible_text: 25,
            missing_security_seal: 40,
        }
    }
}

/// Reference expectations for one known product/brand.
///
/// `expected_fonts`, `security_features` and `packaging_elements` are
/// descriptive only — no check reads them today. The gap is deliberate
/// until product intent is clarified; do not add a check silently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductProfile {
    pub brand_name: String,
    /// Expected dominant colors as `#rrggbb`, most characteristic first.
    pub expected_colors: Vec<String>,
    #[serde(default)]
    pub expected_fonts: Vec<String>,
    /// Every entry must appear (case-insensitive substring) in the
    /// recognized text of an authentic product.
    pub required_text: Vec<String>,
    /// Lowercase keywords matched against detected label descriptions.
    pub expected_labels: Vec<String>,
    #[serde(default)]
    pub security_features: Vec<String>,
    #[serde(default)]
    pub packaging_elements: Vec<String>,
    /// Curated subset of brand text used only by the type classifier; a
    /// partial match should still count toward detection, so this is
    /// intentionally not the full `required_text` list.
    #[serde(default)]
    pub detection_keywords: Vec<String>,
    /// Curated label keywords used only by the type classifier.
    #[serde(default)]
    pub detection_labels: Vec<String>,
    #[serde(default)]
    pub weights: AnomalyWeights,
}

/// Read-only registry of product profiles keyed by product type.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ReferenceCatalog {
    profiles: IndexMap<String, ProductProfile>,
}

impl ReferenceCatalog {
    pub fn new(profiles: IndexMap<String, ProductProfile>) -> Self {
        Self { profiles }
    }

    /// The two reference profiles shipped with the system: a regulated
    /// pharmaceutical (Bayer aspirin) and a licensed spirit (FLA rum).
    pub fn builtin() -> Self {
        let mut profiles = IndexMap::new();
        profiles.insert(
            "bayer".to_string(),
            ProductProfile {
                brand_name: "BAYER".to_string(),
                expected_colors: vec![
                    "#ffffff".to_string(), // label white
                    "#ff0000".to_string(), // Bayer red
                    "#0033a0".to_string(), // Bayer blue
                ],
                expected_fonts: vec!["Arial".to_string(), "Helvetica".to_string()],
                required_text: vec![
                    "BAYER".to_string(),
                    "ASPIRINA".to_string(),
                    "REGISTRO".to_string(),
                    "SANITARIO".to_string(),
                    "LABORATORIO".to_string(),
                    "FABRICANTE".to_string(),
                ],
                expected_labels: vec![
                    "medicine".to_string(),
                    "pharmacy".to_string(),
                    "medical".to_string(),
                    "drug".to_string(),
                    "pill".to_string(),
                    "tablet".to_string(),
                    "bottle".to_string(),
                ],
                security_features: vec![
                    "Hologram".to_string(),
                    "QR Code".to_string(),
                    "Batch Number".to_string(),
                ],
                packaging_elements: vec![
                    "Cross logo".to_string(),
                    "Bayer logo".to_string(),
                    "Pharmaceutical symbols".to_string(),
                ],
                detection_keywords: vec![
                    "BAYER".to_string(),
                    "ASPIRINA".to_string(),
                    "MEDICAMENTO".to_string(),
                    "FARMACIA".to_string(),
                    "LABORATORIO".to_string(),
                ],
                detection_labels: vec![
                    "medicine".to_string(),
                    "pharmacy".to_string(),
                    "medical".to_string(),
                    "drug".to_string(),
                    "pill".to_string(),
                    "tablet".to_string(),
                ],
                weights: AnomalyWeights {
                    required_text_missing: 30,
                    significant_color_mismatch: 25,
                    slight_color_mismatch: 15,
                    no_expected_features: 40,
                    few_expected_features: 20,
                    illegible_text: 35,
                    missing_security_seal: 50,
                },
            },
        );
        profiles.insert(
            "fla".to_string(),
            ProductProfile {
                brand_name: "FLA".to_string(),
                expected_colors: vec![
                    "#8b0000".to_string(), // dark red
                    "#ffd700".to_string(), // gold foil
                    "#000000".to_string(),
                    "#ffffff".to_string(),
                ],
                expected_fonts: vec![
                    "Times New Roman".to_string(),
                    "Georgia".to_string(),
                    "Serif".to_string(),
                ],
                required_text: vec![
                    "FLA".to_string(),
                    "RON".to_string(),
                    "EL CONSUMO DE ESTE PRODUCTO ES NOCIVO PARA LA SALUD".to_string(),
                    "CONTENIDO".to_string(),
                    "Aguardiente Antioqueño".to_string(),
                    "BOTELLA".to_string(),
                    "IMPORTADO".to_string(),
                ],
                expected_labels: vec![
                    "alcohol".to_string(),
                    "bottle".to_string(),
                    "wine".to_string(),
                    "beer".to_string(),
                    "liquor".to_string(),
                    "rum".to_string(),
                    "spirits".to_string(),
                ],
                security_features: vec![
                    "Tax Stamp".to_string(),
                    "Seal".to_string(),
                    "Hologram".to_string(),
                ],
                packaging_elements: vec![
                    "FLA logo".to_string(),
                    "Rum bottle".to_string(),
                    "Caribbean symbols".to_string(),
                ],
                detection_keywords: vec![
                    "FLA".to_string(),
                    "RON".to_string(),
                    "LICOR".to_string(),
                    "ALCOHOL".to_string(),
                    "BOTELLA".to_string(),
                    "DISTRIBUIDOR".to_string(),
                ],
                detection_labels: vec![
                    "alcohol".to_string(),
                    "bottle".to_string(),
                    "wine".to_string(),
                    "beer".to_string(),
                    "liquor".to_string(),
                    "rum".to_string(),
                ],
                weights: AnomalyWeights {
                    required_text_missing: 20,
                    significant_color_mismatch: 35,
                    slight_color_mismatch: 20,
                    no_expected_features: 25,
                    few_expected_features: 15,
                    illegible_text: 20,
                    missing_security_seal: 30,
                },
            },
        );
        Self { profiles }
    }

    /// Look up a profile, failing for unknown types. Auto-detection never
    /// hits this failure path; only a caller-declared type can.
    pub fn get(&self, product_type: &str) -> Result<&ProductProfile, EngineError> {
        self.profiles
            .get(product_type)
            .ok_or_else(|| EngineError::UnknownProductType(product_type.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fallback type when auto-detection is inconclusive: the first
    /// registered profile.
    pub fn default_type(&self) -> Option<&str> {
        self.profiles.keys().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Reject catalogs the engine cannot score against: no profiles, or
    /// expected colors that do not parse as hex.
    pub fn validate(&self) -> Result<(), String> {
        if self.profiles.is_empty() {
            return Err("catalog must contain at least one profile".to_string());
        }
        for (product_type, profile) in &self.profiles {
            for hex in &profile.expected_colors {
                color::parse_hex(hex).map_err(|_| {
                    format!("profile '{product_type}' has unparseable expected color '{hex}'")
                })?;
            }
        }
        Ok(())
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
