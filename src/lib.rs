#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::AppConfig;

/// Install the global fmt subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(config: &AppConfig) {
    let level = config.log_level().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use services::controller::Controller;
    use services::inference_client::HttpInferenceClient;
    use services::preview_service::{PreviewStore, PREVIEW_SCHEME};
    use tauri::Manager;
    use tokio::sync::Mutex;

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .manage(PreviewStore::new())
        .register_uri_scheme_protocol(PREVIEW_SCHEME, |ctx, request| {
            let previews = ctx.app_handle().state::<PreviewStore>();
            commands::preview::serve(&previews, request.uri().path())
        })
        .setup(|app| {
            let config_dir = app.path().app_config_dir()?;

            let (config, config_error) = match AppConfig::load(&config_dir) {
                Ok(config) => (config, None),
                Err(e) => (AppConfig::default(), Some(e)),
            };

            init_tracing(&config);
            if let Some(e) = config_error {
                tracing::warn!("Invalid configuration in {}, using defaults: {}", config_dir.display(), e);
            }
            tracing::info!(
                endpoint = %config.predict_url(),
                timeout_secs = ?config.request_timeout_secs,
                "Flood dashboard starting"
            );

            let client = HttpInferenceClient::new(&config)?;
            app.manage(Mutex::new(Controller::new(config.overlay_opacity)));
            app.manage(client);
            app.manage(config);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::upload::select_image,
            commands::upload::select_image_bytes,
            commands::upload::clear_selection,
            commands::predict::get_session,
            commands::predict::get_config,
            commands::predict::submit_prediction,
            commands::predict::set_overlay,
            commands::export::export_names,
            commands::export::save_mask,
            commands::export::save_prediction_json,
            commands::export::save_overlay,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
