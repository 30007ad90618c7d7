use crate::error::{AppError, ErrorKind};
use crate::models::prediction_types::{PredictionExport, PredictionResult};
use crate::models::upload_types::Selection;
use crate::services::overlay_service;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportNames {
    pub mask: String,
    pub prediction_json: String,
    pub overlay: String,
}

/// Suggested download names derived from the source file, e.g.
/// `flood_aerial.jpg` → `flood_aerial_mask.png`.
pub fn export_names(source_stem: Option<&str>) -> ExportNames {
    match source_stem.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stem) => ExportNames {
            mask: format!("{}_mask.png", stem),
            prediction_json: format!("{}_prediction.json", stem),
            overlay: format!("{}_overlay.png", stem),
        },
        None => ExportNames {
            mask: "flood_mask.png".to_string(),
            prediction_json: "prediction.json".to_string(),
            overlay: "flood_overlay.png".to_string(),
        },
    }
}

pub fn prediction_json(result: &PredictionResult, selection: &Selection) -> Result<String, AppError> {
    let export = PredictionExport {
        source_file: selection.file.name.clone(),
        flood_percent: result.flood_percent,
        risk_level: result.risk_label.clone(),
        risk_category: result.risk_level,
        prediction: result.prediction.clone(),
        mask_width: result.mask.width,
        mask_height: result.mask.height,
        image_width: selection.info.width,
        image_height: selection.info.height,
        latitude: selection.info.location.map(|p| p.latitude),
        longitude: selection.info.location.map(|p| p.longitude),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

pub fn overlay_png(result: &PredictionResult, selection: &Selection, opacity: f32) -> Result<Vec<u8>, AppError> {
    let composed = overlay_service::compose_overlay(
        &selection.file.bytes,
        selection.info.orientation,
        &result.mask.png,
        opacity,
    )?;
    Ok(overlay_service::encode_png(&composed)?)
}

pub async fn write_export(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(path, bytes).await.map_err(|e| AppError {
        kind: ErrorKind::Io,
        message: format!("Failed to write {}: {}", path.display(), e),
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction_types::{MaskImage, RiskLevel};
    use crate::models::upload_types::{GeoPoint, ImageInfo, PreviewHandle, SelectedFile};

    fn selection() -> Selection {
        Selection {
            file: SelectedFile::new("flood_aerial.jpg", "image/jpeg", vec![0u8; 4]),
            preview: PreviewHandle {
                id: 1,
                url: "preview://localhost/1".to_string(),
            },
            info: ImageInfo {
                width: 1024,
                height: 768,
                format: "jpg".to_string(),
                orientation: 1,
                location: Some(GeoPoint {
                    latitude: 13.0,
                    longitude: 80.2,
                }),
                date_taken: None,
            },
        }
    }

    fn result() -> PredictionResult {
        PredictionResult {
            mask: MaskImage {
                png: vec![9u8; 3].into(),
                width: 256,
                height: 256,
            },
            flood_percent: 42.5,
            risk_level: RiskLevel::Medium,
            risk_label: "medium".to_string(),
            prediction: "Flood".to_string(),
        }
    }

    #[test]
    fn names_follow_source_file() {
        let names = export_names(Some("flood_aerial"));
        assert_eq!(names.mask, "flood_aerial_mask.png");
        assert_eq!(names.prediction_json, "flood_aerial_prediction.json");
        assert_eq!(names.overlay, "flood_aerial_overlay.png");

        let fallback = export_names(Some("  "));
        assert_eq!(fallback.mask, "flood_mask.png");
        assert_eq!(fallback.prediction_json, "prediction.json");
        assert_eq!(export_names(None), fallback);
    }

    #[test]
    fn json_export_carries_insights_and_location() {
        let json = prediction_json(&result(), &selection()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source_file"], "flood_aerial.jpg");
        assert_eq!(value["flood_percent"], 42.5);
        assert_eq!(value["risk_level"], "medium");
        assert_eq!(value["risk_category"], "medium");
        assert_eq!(value["prediction"], "Flood");
        assert_eq!(value["mask_width"], 256);
        assert_eq!(value["latitude"], 13.0);
        assert!(json.contains('\n'), "pretty printed");
    }

    #[tokio::test]
    async fn writes_bytes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flood_aerial_mask.png");
        write_export(&path, &result().mask.png).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9u8; 3]);

        let err = write_export(&dir.path().join("missing/dir/x.png"), b"x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
