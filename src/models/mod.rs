pub mod prediction_types;
pub mod session_types;
pub mod upload_types;
