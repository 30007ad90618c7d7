use crate::services::preview_service::PreviewStore;
use tauri::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use tauri::http::{Response, StatusCode};

/// Handler body for the `preview://` URI scheme.
pub fn serve(previews: &PreviewStore, path: &str) -> Response<Vec<u8>> {
    let response = match previews.resolve_path(path) {
        Some(asset) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, asset.mime)
            .header(CACHE_CONTROL, "no-store")
            .body(asset.bytes.to_vec()),
        None => {
            tracing::debug!(path, "Preview not found or revoked");
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Vec::new())
        }
    };

    response.unwrap_or_else(|e| {
        tracing::error!("Failed to build preview response: {}", e);
        let mut fallback = Response::new(Vec::new());
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
