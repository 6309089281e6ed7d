use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EcoError;

/// How a material should be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisposalMethod {
    Recycle,
    Compost,
    Landfill,
    Hazardous,
}

impl DisposalMethod {
    pub const ALL: [DisposalMethod; 4] = [
        DisposalMethod::Recycle,
        DisposalMethod::Compost,
        DisposalMethod::Landfill,
        DisposalMethod::Hazardous,
    ];
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposalMethod::Recycle => write!(f, "Recycle"),
            DisposalMethod::Compost => write!(f, "Compost"),
            DisposalMethod::Landfill => write!(f, "Landfill"),
            DisposalMethod::Hazardous => write!(f, "Hazardous"),
        }
    }
}

/// Which backend family serves inference requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Mock,
    #[default]
    Real,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Mock => write!(f, "mock"),
            Mode::Real => write!(f, "real"),
        }
    }
}

impl FromStr for Mode {
    type Err = EcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "real" => Ok(Mode::Real),
            other => Err(EcoError::InvalidMode(other.to_string())),
        }
    }
}

/// Provenance tag attached to every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Mock,
    RealHf,
    RealHfUnavailable,
    RealHfEmpty,
    RealHfError,
    HuggingfaceReal,
    HuggingfaceFallback,
    HuggingfaceEmpty,
    HuggingfaceError,
}

/// An eco-friendly product suggested as a replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeProduct {
    pub id: u32,
    pub name: String,
    pub score: f64,
}

/// One entry of an image-classification model's ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Sustainability analysis of a single product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub disposal: DisposalMethod,
    pub carbon_kg: f64,
    pub alt_products: Vec<AlternativeProduct>,
    pub detected_materials: Vec<String>,
    pub alert: bool,
    pub confidence: f64,
    pub analysis_method: AnalysisMethod,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnalysisResult {
    /// Placeholder returned when a model-backed analysis cannot produce a label.
    pub fn sentinel(method: AnalysisMethod, note: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            disposal: DisposalMethod::Landfill,
            carbon_kg: 0.0,
            alt_products: Vec::new(),
            detected_materials: vec!["unknown".to_string()],
            alert: false,
            confidence: 0.0,
            analysis_method: method,
            timestamp: Utc::now(),
            note: Some(note.into()),
        }
    }
}

/// Waste bin categories recognised by the segregation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Plastic,
    Organic,
    Paper,
    Glass,
    Metal,
    Hazardous,
}

impl WasteCategory {
    /// Categories the rule cascade falls back to for unrecognised filenames.
    pub const SORTABLE: [WasteCategory; 5] = [
        WasteCategory::Plastic,
        WasteCategory::Organic,
        WasteCategory::Paper,
        WasteCategory::Glass,
        WasteCategory::Metal,
    ];
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WasteCategory::Plastic => "plastic",
            WasteCategory::Organic => "organic",
            WasteCategory::Paper => "paper",
            WasteCategory::Glass => "glass",
            WasteCategory::Metal => "metal",
            WasteCategory::Hazardous => "hazardous",
        };
        f.write_str(s)
    }
}

/// Verdict of the rule-based segregation check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegregationResult {
    #[serde(rename = "segregatedCorrectly")]
    pub is_correct: bool,
    pub confidence: f64,
    pub reason: String,
    #[serde(rename = "wasteTypes")]
    pub waste_types: Vec<WasteCategory>,
    pub recommendations: Vec<String>,
    pub alert: bool,
    pub timestamp: DateTime<Utc>,
    pub analysis_method: AnalysisMethod,
}

/// Raw label returned by a model-backed segregation check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSegregation {
    pub filename: String,
    pub category: String,
    pub confidence: f64,
    pub analysis_method: AnalysisMethod,
    pub note: String,
}

/// Response body of a segregation check, whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegregationReport {
    Rule(SegregationResult),
    Model(ModelSegregation),
}

impl SegregationReport {
    pub fn analysis_method(&self) -> AnalysisMethod {
        match self {
            SegregationReport::Rule(r) => r.analysis_method,
            SegregationReport::Model(m) => m.analysis_method,
        }
    }
}

/// Round half away from zero to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("mock".parse::<Mode>().unwrap(), Mode::Mock);
        assert_eq!(" REAL ".parse::<Mode>().unwrap(), Mode::Real);
        assert!(matches!(
            "hybrid".parse::<Mode>(),
            Err(EcoError::InvalidMode(m)) if m == "hybrid"
        ));
    }

    #[test]
    fn test_segregation_result_uses_camel_case_keys() {
        let result = SegregationResult {
            is_correct: true,
            confidence: 0.81,
            reason: "Proper segregation detected".into(),
            waste_types: vec![WasteCategory::Plastic],
            recommendations: vec!["Good separation".into()],
            alert: false,
            timestamp: Utc::now(),
            analysis_method: AnalysisMethod::Mock,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["segregatedCorrectly"], true);
        assert_eq!(json["wasteTypes"][0], "plastic");
        assert_eq!(json["analysis_method"], "mock");
        assert!(json.get("is_correct").is_none());
    }

    #[test]
    fn test_sentinel_carries_note() {
        let result = AnalysisResult::sentinel(AnalysisMethod::RealHfEmpty, "no predictions");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["analysis_method"], "real_hf_empty");
        assert_eq!(json["disposal"], "Landfill");
        assert_eq!(json["detected_materials"][0], "unknown");
        assert_eq!(json["note"], "no predictions");
    }

    #[test]
    fn test_untagged_report_serializes_inner_shape() {
        let report = SegregationReport::Model(ModelSegregation {
            filename: "bin.jpg".into(),
            category: "unknown".into(),
            confidence: 0.0,
            analysis_method: AnalysisMethod::HuggingfaceFallback,
            note: "model not available".into(),
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["category"], "unknown");
        assert_eq!(json["analysis_method"], "huggingface_fallback");
        assert_eq!(report.analysis_method(), AnalysisMethod::HuggingfaceFallback);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(9.96, 1), 10.0);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
