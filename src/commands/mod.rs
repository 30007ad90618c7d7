pub mod export;
pub mod predict;
pub mod preview;
pub mod upload;

use crate::models::session_types::SessionView;
use tauri::{AppHandle, Emitter};

pub const SESSION_EVENT: &str = "session-changed";

/// Push a session snapshot to the webview (fire and forget).
pub fn emit_session(app: &AppHandle, view: SessionView) {
    if let Err(e) = app.emit(SESSION_EVENT, view) {
        tracing::warn!("Failed to emit {}: {}", SESSION_EVENT, e);
    }
}
