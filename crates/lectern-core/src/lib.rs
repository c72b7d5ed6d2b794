//! Lectern Core Library
//!
//! Domain models, wire types, error types, configuration and the `MaterialApi`
//! trait shared by the HTTP client, the upload/sync engine and the CLI.

pub mod api;
pub mod config;
pub mod error;
pub mod media_types;
pub mod models;

// Re-export commonly used types
pub use api::{ApiResult, MaterialApi};
pub use config::{ClientConfig, UploadPolicy};
pub use error::{failure_message, ApiError, UploadError, UploadStep, UploadStepExt};
pub use media_types::{is_accepted, media_label, AcceptedMediaType};
