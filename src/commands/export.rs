use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::controller::Controller;
use crate::services::export_service::{self, ExportNames};
use std::path::PathBuf;
use tauri::State;
use tokio::sync::Mutex;

const NOTHING_TO_EXPORT: &str = "No prediction available to export.";

#[tauri::command]
pub async fn export_names(session: State<'_, Mutex<Controller>>) -> Result<ExportNames, AppError> {
    let controller = session.lock().await;
    let stem = controller.selection().map(|s| s.file.stem().to_string());
    Ok(export_service::export_names(stem.as_deref()))
}

#[tauri::command]
pub async fn save_mask(path: String, session: State<'_, Mutex<Controller>>) -> Result<String, AppError> {
    let png = {
        let controller = session.lock().await;
        let (result, _) = controller.current_result().ok_or(NOTHING_TO_EXPORT)?;
        result.mask.png.clone()
    };

    let path = PathBuf::from(path);
    export_service::write_export(&path, &png).await?;
    Ok(path.to_string_lossy().to_string())
}

#[tauri::command]
pub async fn save_prediction_json(
    path: String,
    session: State<'_, Mutex<Controller>>,
) -> Result<String, AppError> {
    let json = {
        let controller = session.lock().await;
        let (result, selection) = controller.current_result().ok_or(NOTHING_TO_EXPORT)?;
        export_service::prediction_json(result, selection)?
    };

    let path = PathBuf::from(path);
    export_service::write_export(&path, json.as_bytes()).await?;
    Ok(path.to_string_lossy().to_string())
}

#[tauri::command]
pub async fn save_overlay(
    path: String,
    config: State<'_, AppConfig>,
    session: State<'_, Mutex<Controller>>,
) -> Result<String, AppError> {
    let (result, selection) = {
        let controller = session.lock().await;
        let (result, selection) = controller.current_result().ok_or(NOTHING_TO_EXPORT)?;
        (result.clone(), selection.clone())
    };
    let opacity = config.overlay_opacity;

    // Decoding and re-encoding full-size imagery is CPU-bound.
    let png = tokio::task::spawn_blocking(move || {
        export_service::overlay_png(&result, &selection, opacity)
    })
    .await
    .map_err(|e| AppError::from(format!("Task join failed: {}", e)))??;

    let path = PathBuf::from(path);
    export_service::write_export(&path, &png).await?;
    Ok(path.to_string_lossy().to_string())
}
