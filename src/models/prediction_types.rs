use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JSON body returned by `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub mask_image_base64: String,
    pub flood_percent: f64,
    pub risk_level: String,
    pub prediction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// Case-insensitive; anything unrecognised, including the empty string, is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#ef4444",
            RiskLevel::Unknown => "#64748b",
        }
    }
}

/// Decoded PNG mask returned by the inference service.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImage {
    pub png: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub mask: MaskImage,
    pub flood_percent: f64,
    pub risk_level: RiskLevel,
    /// Risk value exactly as sent by the server.
    pub risk_label: String,
    pub prediction: String,
}

/// Subset of a prediction written by the JSON download.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionExport {
    pub source_file: String,
    pub flood_percent: f64,
    pub risk_level: String,
    pub risk_category: RiskLevel,
    pub prediction: String,
    pub mask_width: u32,
    pub mask_height: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_parsing_is_total() {
        assert_eq!(RiskLevel::from_label("low"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_label(" MEDIUM "), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_label("High"), RiskLevel::High);
        for label in ["", "severe", "none", "🌊", "l o w"] {
            assert_eq!(RiskLevel::from_label(label), RiskLevel::Unknown);
        }
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
