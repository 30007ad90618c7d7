use crate::models::upload_types::ImageInfo;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    ReadyToSubmit,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub src: String,
    pub opacity: f32,
    pub blend_mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub original_src: String,
    pub overlay: Option<OverlayLayer>,
    pub show_overlay: bool,
    pub mask_src: String,
    pub mask_width: u32,
    pub mask_height: u32,
    pub flood_percent: f64,
    pub flood_coverage: String,
    pub risk: Badge,
    pub prediction: Badge,
}

/// Snapshot pushed to the webview after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub state: RequestState,
    pub can_submit: bool,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
    pub image: Option<ImageInfo>,
    pub show_overlay: bool,
    pub result: Option<ResultView>,
    pub notice: Option<Notice>,
}
