use crate::error::PredictError;
use crate::models::upload_types::{ImageInfo, PreviewHandle, SelectedFile, Selection};
use crate::services::exif_service;
use image::{ImageFormat, ImageReader};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const PREVIEW_SCHEME: &str = "preview";

/// Formats the webview can display and the inference service accepts.
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Gif,
];

#[derive(Debug, Clone)]
pub struct PreviewAsset {
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

/// Registry behind the `preview://` URI scheme. A handle resolves until it is
/// revoked, after which the protocol answers 404.
#[derive(Debug, Default)]
pub struct PreviewStore {
    next_id: AtomicU64,
    assets: Mutex<HashMap<u64, PreviewAsset>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &SelectedFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let asset = PreviewAsset {
            mime: file.mime.clone(),
            bytes: file.bytes.clone(),
        };
        self.lock().insert(id, asset);
        tracing::debug!(id, file = %file.name, "Preview created");

        PreviewHandle {
            id,
            url: preview_url(id),
        }
    }

    pub fn revoke(&self, handle: &PreviewHandle) -> bool {
        let removed = self.lock().remove(&handle.id).is_some();
        if removed {
            tracing::debug!(id = handle.id, "Preview revoked");
        }
        removed
    }

    pub fn get(&self, id: u64) -> Option<PreviewAsset> {
        self.lock().get(&id).cloned()
    }

    /// Resolve a request path such as `/12` to its asset.
    pub fn resolve_path(&self, path: &str) -> Option<PreviewAsset> {
        let id = path.trim_matches('/').parse::<u64>().ok()?;
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, PreviewAsset>> {
        // A panic while holding the map cannot leave it half-written.
        self.assets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Custom protocols are served as `http://<scheme>.localhost` on Windows and
/// Android and as `<scheme>://localhost` elsewhere.
pub fn preview_url(id: u64) -> String {
    if cfg!(any(windows, target_os = "android")) {
        format!("http://{}.localhost/{}", PREVIEW_SCHEME, id)
    } else {
        format!("{}://localhost/{}", PREVIEW_SCHEME, id)
    }
}

/// Read a picked file from disk, rejecting anything over `max_bytes` before
/// loading it.
pub async fn read_image_file(path: &Path, max_bytes: u64) -> Result<SelectedFile, PredictError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| PredictError::validation(format!("Cannot read {}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(PredictError::validation(format!(
            "{} is not a file",
            path.display()
        )));
    }
    check_size(metadata.len(), max_bytes)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PredictError::validation(format!("Cannot read {}: {}", path.display(), e)))?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    from_bytes(name, bytes, max_bytes)
}

/// Build a [`SelectedFile`] from bytes handed over by the webview.
pub fn from_bytes(name: String, bytes: Vec<u8>, max_bytes: u64) -> Result<SelectedFile, PredictError> {
    check_size(bytes.len() as u64, max_bytes)?;
    let format = detect_format(&bytes)?;
    Ok(SelectedFile::new(name, format.to_mime_type(), bytes))
}

/// Validate the file and register its preview.
pub fn prepare_selection(store: &PreviewStore, file: SelectedFile) -> Result<Selection, PredictError> {
    let info = inspect(&file.bytes)?;
    let preview = store.create(&file);
    Ok(Selection { file, preview, info })
}

pub fn inspect(bytes: &[u8]) -> Result<ImageInfo, PredictError> {
    let format = detect_format(bytes)?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| PredictError::validation(format!("Unreadable image: {}", e)))?;

    let exif = exif_service::read_summary(bytes);

    Ok(ImageInfo {
        width,
        height,
        format: format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("image")
            .to_string(),
        orientation: exif.orientation.unwrap_or(1),
        location: exif.location,
        date_taken: exif.date_taken,
    })
}

fn detect_format(bytes: &[u8]) -> Result<ImageFormat, PredictError> {
    if bytes.is_empty() {
        return Err(PredictError::validation("The selected file is empty."));
    }

    match image::guess_format(bytes) {
        Ok(format) if ACCEPTED_FORMATS.contains(&format) => Ok(format),
        Ok(format) => Err(PredictError::validation(format!(
            "Unsupported image type: {:?}. Use JPG or PNG.",
            format
        ))),
        Err(_) => Err(PredictError::validation(
            "The selected file is not an image. Use JPG or PNG.",
        )),
    }
}

fn check_size(len: u64, max_bytes: u64) -> Result<(), PredictError> {
    if len > max_bytes {
        return Err(PredictError::validation(format!(
            "Image is too large ({} MiB, limit {} MiB).",
            len / (1024 * 1024),
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}
