use crate::commands::emit_session;
use crate::config::AppConfig;
use crate::error::{AppError, PredictError};
use crate::models::session_types::SessionView;
use crate::services::controller::Controller;
use crate::services::inference_client::HttpInferenceClient;
use crate::services::predict_service::{self, SubmitOutcome};
use tauri::{AppHandle, State};
use tokio::sync::Mutex;

#[tauri::command]
pub async fn get_session(session: State<'_, Mutex<Controller>>) -> Result<SessionView, AppError> {
    Ok(session.lock().await.view())
}

#[tauri::command]
pub fn get_config(config: State<'_, AppConfig>) -> AppConfig {
    config.inner().clone()
}

/// Upload the selected image and wait for the prediction.
///
/// Request failures are not returned as errors: they land in the session as
/// a Failed state with a notice, same as every other transition.
#[tauri::command]
pub async fn submit_prediction(
    app: AppHandle,
    client: State<'_, HttpInferenceClient>,
    session: State<'_, Mutex<Controller>>,
) -> Result<SessionView, AppError> {
    let emitter = app.clone();
    let outcome = predict_service::submit(&session, client.inner(), move |view| {
        emit_session(&emitter, view)
    })
    .await;

    match outcome {
        Ok(SubmitOutcome::Discarded) => {
            tracing::debug!("Prediction finished for a replaced image");
        }
        Ok(_) => {}
        // The notice is already in the session view.
        Err(err @ PredictError::Validation { .. }) => {
            tracing::debug!("Submit rejected: {}", err);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(session.lock().await.view())
}

#[tauri::command]
pub async fn set_overlay(
    app: AppHandle,
    visible: bool,
    session: State<'_, Mutex<Controller>>,
) -> Result<SessionView, AppError> {
    let mut controller = session.lock().await;
    controller.set_overlay(visible);
    let view = controller.view();
    emit_session(&app, view.clone());
    Ok(view)
}
