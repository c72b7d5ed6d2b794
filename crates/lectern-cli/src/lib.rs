use lectern_core::media_label;
use lectern_core::models::{Material, MaterialId, MaterialSource, UserId, Visibility};
use lectern_sync::UploadItem;
use serde::Serialize;

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Human-readable file size: `B` below 1 KB, then `KB` and `MB` with one
/// decimal. Zero renders as an empty string.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        String::new()
    } else if bytes < BYTES_PER_KB {
        format!("{} B", bytes)
    } else if bytes < BYTES_PER_MB {
        format!("{:.1} KB", bytes as f64 / BYTES_PER_KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MB as f64)
    }
}

/// One queued file in the `upload` report.
#[derive(Debug, Serialize)]
pub struct UploadRow {
    pub name: String,
    pub size: String,
    pub kind: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<MaterialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&UploadItem> for UploadRow {
    fn from(item: &UploadItem) -> Self {
        Self {
            name: item.file.name.clone(),
            size: format_size(item.file.size),
            kind: media_label(&item.file.media_type),
            status: item.status.label(),
            material_id: item.material_id(),
            error: item.error().map(str::to_string),
        }
    }
}

/// One material in the `list` output.
#[derive(Debug, Serialize)]
pub struct MaterialRow {
    pub id: MaterialId,
    pub name: String,
    pub kind: &'static str,
    pub visibility: Visibility,
    pub source: MaterialSource,
    pub owned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl MaterialRow {
    pub fn new(material: &Material, current_user: Option<UserId>) -> Self {
        Self {
            id: material.id,
            name: material.name.clone(),
            kind: media_label(&material.media_type),
            visibility: material.visibility,
            source: material.source,
            owned: current_user == Some(material.owner_id),
            download_url: material.download_url.clone(),
        }
    }
}

/// Initialize tracing for the CLI. Logs go to stderr; stdout carries the JSON
/// output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
