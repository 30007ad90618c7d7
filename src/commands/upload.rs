use crate::commands::emit_session;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::session_types::SessionView;
use crate::models::upload_types::SelectedFile;
use crate::services::controller::Controller;
use crate::services::preview_service::{self, PreviewStore};
use std::path::Path;
use tauri::{AppHandle, State};
use tokio::sync::Mutex;

#[tauri::command]
pub async fn select_image(
    app: AppHandle,
    path: String,
    config: State<'_, AppConfig>,
    previews: State<'_, PreviewStore>,
    session: State<'_, Mutex<Controller>>,
) -> Result<SessionView, AppError> {
    let file = preview_service::read_image_file(Path::new(&path), config.max_upload_bytes).await?;
    apply_selection(&app, file, &previews, &session).await
}

/// Same as [`select_image`] for files dropped onto or picked inside the webview.
#[tauri::command]
pub async fn select_image_bytes(
    app: AppHandle,
    name: String,
    bytes: Vec<u8>,
    config: State<'_, AppConfig>,
    previews: State<'_, PreviewStore>,
    session: State<'_, Mutex<Controller>>,
) -> Result<SessionView, AppError> {
    let file = preview_service::from_bytes(name, bytes, config.max_upload_bytes)?;
    apply_selection(&app, file, &previews, &session).await
}

#[tauri::command]
pub async fn clear_selection(
    app: AppHandle,
    previews: State<'_, PreviewStore>,
    session: State<'_, Mutex<Controller>>,
) -> Result<SessionView, AppError> {
    let mut controller = session.lock().await;
    if let Some(old) = controller.clear() {
        previews.revoke(&old);
    }
    let view = controller.view();
    emit_session(&app, view.clone());
    Ok(view)
}

async fn apply_selection(
    app: &AppHandle,
    file: SelectedFile,
    previews: &PreviewStore,
    session: &Mutex<Controller>,
) -> Result<SessionView, AppError> {
    let selection = preview_service::prepare_selection(previews, file)?;

    let mut controller = session.lock().await;
    if let Some(old) = controller.select(selection) {
        previews.revoke(&old);
    }
    let view = controller.view();
    emit_session(app, view.clone());
    Ok(view)
}
