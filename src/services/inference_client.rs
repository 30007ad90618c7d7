use crate::config::AppConfig;
use crate::error::PredictError;
use crate::models::prediction_types::{MaskImage, PredictResponse, PredictionResult, RiskLevel};
use crate::models::upload_types::SelectedFile;
use base64::Engine;
use futures::StreamExt;
use image::ImageFormat;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Instant;
use url::Url;

/// Name of the multipart field the inference service reads the image from.
pub const FILE_FIELD: &str = "file";

/// Anything that can turn an uploaded image into a prediction.
pub trait InferenceClient: Send + Sync {
    fn predict(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<PredictionResult, PredictError>> + Send;
}

/// Talks to the flood segmentation service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    predict_url: Url,
    max_response_bytes: u64,
}

impl HttpInferenceClient {
    pub fn new(config: &AppConfig) -> Result<Self, PredictError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            predict_url: config.predict_url(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, PredictError> {
        if let Some(len) = response.content_length() {
            if len > self.max_response_bytes {
                return Err(PredictError::malformed(format!(
                    "response of {} bytes exceeds limit of {}",
                    len, self.max_response_bytes
                )));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if (body.len() + chunk.len()) as u64 > self.max_response_bytes {
                return Err(PredictError::malformed(format!(
                    "response exceeds limit of {} bytes",
                    self.max_response_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        let start = Instant::now();

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::info!(
            url = %self.predict_url,
            file = %file.name,
            bytes = file.len(),
            "Submitting image for prediction"
        );

        let response = self
            .client
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Inference service returned an error status");
            return Err(PredictError::Status {
                status: status.as_u16(),
            });
        }

        let body = self.read_body(response).await?;
        tracing::debug!(
            status = status.as_u16(),
            body_bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Inference response received"
        );

        parse_predict_response(&body)
    }
}

/// Decode a `/predict` JSON body into a [`PredictionResult`].
///
/// All four fields are required. The percentage must be a finite value in
/// `[0, 100]` and the mask must decode as a PNG; anything else is a malformed
/// response.
pub fn parse_predict_response(body: &[u8]) -> Result<PredictionResult, PredictError> {
    let response: PredictResponse = serde_json::from_slice(body)
        .map_err(|e| PredictError::malformed(format!("invalid JSON payload: {}", e)))?;

    if !response.flood_percent.is_finite() || !(0.0..=100.0).contains(&response.flood_percent) {
        return Err(PredictError::malformed(format!(
            "flood_percent out of range: {}",
            response.flood_percent
        )));
    }

    let mask = decode_mask(&response.mask_image_base64)?;

    Ok(PredictionResult {
        mask,
        flood_percent: response.flood_percent,
        risk_level: RiskLevel::from_label(&response.risk_level),
        risk_label: response.risk_level,
        prediction: response.prediction,
    })
}

fn decode_mask(encoded: &str) -> Result<MaskImage, PredictError> {
    // Some deployments send a ready-made data URI.
    let payload = match encoded.find(";base64,") {
        Some(idx) if encoded.starts_with("data:") => &encoded[idx + ";base64,".len()..],
        _ => encoded,
    };

    let png = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| PredictError::malformed(format!("mask is not valid base64: {}", e)))?;

    let img = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|e| PredictError::malformed(format!("mask is not a decodable PNG: {}", e)))?;

    Ok(MaskImage {
        width: img.width(),
        height: img.height(),
        png: png.into(),
    })
}
