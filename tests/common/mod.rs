#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use flood_dashboard_lib::config::AppConfig;
use flood_dashboard_lib::error::PredictError;
use flood_dashboard_lib::models::prediction_types::{MaskImage, PredictionResult, RiskLevel};
use flood_dashboard_lib::models::upload_types::SelectedFile;
use flood_dashboard_lib::services::inference_client::InferenceClient;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 140]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

/// 8x8 mask, left half flooded.
pub fn mask_png() -> Vec<u8> {
    let mask = GrayImage::from_fn(8, 8, |x, _| if x < 4 { Luma([255]) } else { Luma([0]) });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(mask)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn success_body(percent: f64, risk: &str, prediction: &str) -> serde_json::Value {
    serde_json::json!({
        "mask_image_base64": base64::engine::general_purpose::STANDARD.encode(mask_png()),
        "flood_percent": percent,
        "risk_level": risk,
        "prediction": prediction,
    })
}

pub fn prediction(percent: f64) -> PredictionResult {
    PredictionResult {
        mask: MaskImage {
            png: mask_png().into(),
            width: 8,
            height: 8,
        },
        flood_percent: percent,
        risk_level: RiskLevel::High,
        risk_label: "high".to_string(),
        prediction: "Flood".to_string(),
    }
}

pub fn aerial_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/jpeg", jpeg_bytes(32, 24))
}

pub fn config_for(base_url: &Url) -> AppConfig {
    AppConfig {
        api_base_url: base_url.clone(),
        ..AppConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Mock inference service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Reply {
    Json(serde_json::Value),
    Status(u16),
    Raw(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
}

pub struct MockServer {
    pub base_url: Url,
    pub hits: Arc<AtomicUsize>,
    pub parts: Arc<Mutex<Vec<ReceivedPart>>>,
}

impl MockServer {
    pub async fn start(reply: Reply) -> Self {
        Self::start_with_delay(reply, None).await
    }

    pub async fn start_with_delay(reply: Reply, delay: Option<Duration>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let parts = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply,
            delay,
            hits: hits.clone(),
            parts: parts.clone(),
        };

        let app = Router::new()
            .route("/predict", post(predict_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            hits,
            parts,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn parts(&self) -> Vec<ReceivedPart> {
        self.parts.lock().unwrap().clone()
    }
}

async fn predict_handler(State(state): State<ServerState>, mut multipart: Multipart) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.parts.lock().unwrap().push(ReceivedPart {
            field: field_name,
            file_name,
            content_type,
            len,
        });
    }

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    match state.reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(code) => (
            StatusCode::from_u16(code).unwrap(),
            "inference failed",
        )
            .into_response(),
        Reply::Raw(body) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response(),
    }
}

/// Address nothing listens on.
pub async fn closed_port_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

// ---------------------------------------------------------------------------
// Scripted client
// ---------------------------------------------------------------------------

/// Replays queued outcomes. When gated, each call signals `started` and then
/// waits for `release` before answering.
pub struct ScriptedClient {
    pub calls: AtomicUsize,
    pub started: Notify,
    pub release: Notify,
    gated: bool,
    outcomes: Mutex<VecDeque<Result<PredictionResult, PredictError>>>,
}

impl ScriptedClient {
    pub fn immediate(outcomes: Vec<Result<PredictionResult, PredictError>>) -> Self {
        Self::build(outcomes, false)
    }

    pub fn gated(outcomes: Vec<Result<PredictionResult, PredictError>>) -> Self {
        Self::build(outcomes, true)
    }

    fn build(outcomes: Vec<Result<PredictionResult, PredictError>>, gated: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            release: Notify::new(),
            gated,
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Result<PredictionResult, PredictError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PredictError::Transport {
                message: "no scripted outcome".to_string(),
            }))
    }
}

impl InferenceClient for ScriptedClient {
    async fn predict(&self, _file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.next_outcome()
    }
}
