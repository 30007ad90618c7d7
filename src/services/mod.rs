pub mod controller;
pub mod exif_service;
pub mod export_service;
pub mod inference_client;
pub mod overlay_service;
pub mod predict_service;
pub mod preview_service;
pub mod renderer;
