//! Pure presentation of a finished prediction.
//!
//! Nothing here touches the session: the controller passes in the result, the
//! preview it belongs to and the overlay flag, and gets a [`ResultView`] back.

use crate::models::prediction_types::{PredictionResult, RiskLevel};
use crate::models::session_types::{Badge, OverlayLayer, ResultView};
use crate::models::upload_types::PreviewHandle;
use base64::Engine;

const OVERLAY_BLEND_MODE: &str = "multiply";

pub fn render(
    result: &PredictionResult,
    preview: &PreviewHandle,
    show_overlay: bool,
    overlay_opacity: f32,
) -> ResultView {
    let mask_src = mask_data_uri(&result.mask.png);

    let overlay = show_overlay.then(|| OverlayLayer {
        src: mask_src.clone(),
        opacity: overlay_opacity,
        blend_mode: OVERLAY_BLEND_MODE,
    });

    ResultView {
        original_src: preview.url.clone(),
        overlay,
        show_overlay,
        mask_src,
        mask_width: result.mask.width,
        mask_height: result.mask.height,
        flood_percent: result.flood_percent,
        flood_coverage: format_coverage(result.flood_percent),
        risk: risk_badge(&result.risk_label),
        prediction: prediction_badge(&result.prediction),
    }
}

pub fn mask_data_uri(png: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{}", b64)
}

/// `42.5` → `"42.5%"`, `40.0` → `"40%"`, `33.3333` → `"33.33%"`.
pub fn format_coverage(percent: f64) -> String {
    let rounded = (percent * 100.0).round() / 100.0;
    // -0.0 would print as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}%", rounded)
}

/// Badge color for any risk string; never fails.
pub fn risk_color(label: &str) -> &'static str {
    RiskLevel::from_label(label).color()
}

pub fn risk_badge(label: &str) -> Badge {
    let label = label.trim();
    Badge {
        label: if label.is_empty() {
            "Unknown".to_string()
        } else {
            label.to_string()
        },
        color: risk_color(label),
    }
}

pub fn prediction_color(label: &str) -> &'static str {
    let label = label.trim();
    if label.is_empty() {
        return "#6b7280";
    }
    match label.to_ascii_lowercase().as_str() {
        "flood" => "#2563eb",
        "fire" => "#dc2626",
        "collapse" => "#ca8a04",
        _ => "#4b5563",
    }
}

pub fn prediction_badge(label: &str) -> Badge {
    let trimmed = label.trim();
    Badge {
        label: if trimmed.is_empty() {
            "Unknown".to_string()
        } else {
            trimmed.to_string()
        },
        color: prediction_color(trimmed),
    }
}
