//! Intake: screen candidate files before they enter the upload queue.
//!
//! Only the accepted media types pass. Rejected files never reach the queue; the
//! report lists them so a caller can decide whether to show anything.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use lectern_core::models::FileDescriptor;
use lectern_core::{is_accepted, AcceptedMediaType};

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A picked file with its content, not yet queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub descriptor: FileDescriptor,
    pub content: Bytes,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            descriptor: FileDescriptor::new(name, content.len() as u64, media_type),
            content,
        }
    }

    /// Read a file from disk, deriving its media type from the extension.
    /// Unknown extensions get a generic type and are rejected by [`screen`].
    pub async fn from_path(path: &Path) -> Result<Self, IntakeRejection> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| IntakeRejection::Unreadable {
                path: path.to_path_buf(),
                reason: "path has no file name".to_string(),
            })?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| IntakeRejection::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let media_type = AcceptedMediaType::from_filename(&name)
            .map(|t| t.mime())
            .unwrap_or(UNKNOWN_MEDIA_TYPE);

        Ok(Self::new(name, media_type, Bytes::from(content)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeRejection {
    #[error("{name}: unsupported media type '{media_type}'")]
    UnsupportedType { name: String, media_type: String },

    #[error("{name}: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("{}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Files that may be queued, in arrival order
    pub accepted: Vec<PendingFile>,
    pub rejected: Vec<IntakeRejection>,
}

/// Keep files whose media type is accepted and, when a ceiling is configured,
/// whose size fits under it. Arrival order is preserved.
pub fn screen(files: Vec<PendingFile>, max_file_size_bytes: Option<u64>) -> IntakeReport {
    let mut report = IntakeReport::default();

    for file in files {
        let descriptor = &file.descriptor;
        if !is_accepted(&descriptor.media_type) {
            tracing::debug!(
                filename = %descriptor.name,
                media_type = %descriptor.media_type,
                "Dropping file with unsupported media type"
            );
            report.rejected.push(IntakeRejection::UnsupportedType {
                name: descriptor.name.clone(),
                media_type: descriptor.media_type.clone(),
            });
            continue;
        }

        if let Some(limit) = max_file_size_bytes {
            if descriptor.size > limit {
                tracing::debug!(
                    filename = %descriptor.name,
                    size = descriptor.size,
                    limit,
                    "Dropping file over the size limit"
                );
                report.rejected.push(IntakeRejection::TooLarge {
                    name: descriptor.name.clone(),
                    size: descriptor.size,
                    limit,
                });
                continue;
            }
        }

        report.accepted.push(file);
    }

    report
}

/// Read every path, collecting unreadable ones as rejections.
pub async fn load_paths(paths: &[PathBuf]) -> (Vec<PendingFile>, Vec<IntakeRejection>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();

    for path in paths {
        match PendingFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Skipping unreadable file");
                rejected.push(rejection);
            }
        }
    }

    (files, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, media_type: &str, len: usize) -> PendingFile {
        PendingFile::new(name, media_type, Bytes::from(vec![b'x'; len]))
    }

    #[test]
    fn keeps_accepted_types_in_order() {
        let report = screen(
            vec![
                file("b.csv", "text/csv", 3),
                file("movie.mp4", "video/mp4", 3),
                file("a.pdf", "application/pdf", 3),
            ],
            None,
        );

        let names: Vec<_> = report
            .accepted
            .iter()
            .map(|f| f.descriptor.name.as_str())
            .collect();
        assert_eq!(names, vec!["b.csv", "a.pdf"]);
        assert_eq!(
            report.rejected,
            vec![IntakeRejection::UnsupportedType {
                name: "movie.mp4".into(),
                media_type: "video/mp4".into()
            }]
        );
    }

    #[test]
    fn no_size_ceiling_by_default() {
        let report = screen(vec![file("big.txt", "text/plain", 4096)], None);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].descriptor.size, 4096);
    }

    #[test]
    fn optional_size_ceiling() {
        let report = screen(
            vec![
                file("small.txt", "text/plain", 10),
                file("big.txt", "text/plain", 11),
            ],
            Some(10),
        );
        assert_eq!(report.accepted.len(), 1);
        assert!(matches!(
            report.rejected[0],
            IntakeRejection::TooLarge { size: 11, limit: 10, .. }
        ));
    }

    #[tokio::test]
    async fn reads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("Syllabus.PDF");
        let unknown = dir.path().join("data.bin");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        std::fs::write(&unknown, b"\x00\x01").unwrap();
        let missing = dir.path().join("missing.txt");

        let (files, rejected) = load_paths(&[pdf, unknown, missing]).await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].descriptor.media_type, "application/pdf");
        assert_eq!(files[0].descriptor.size, 8);
        assert_eq!(files[1].descriptor.media_type, UNKNOWN_MEDIA_TYPE);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], IntakeRejection::Unreadable { .. }));

        let report = screen(files, None);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 1);
    }
}
