//! Per-item upload lifecycle.
//!
//! `queued → uploading → {done, error}`. The material id lives on the `Done`
//! arm and the failure message on the `Error` arm, so an item can never be done
//! without a material or carry an error while done.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};

use lectern_core::models::{FileDescriptor, MaterialId};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, strictly increasing upload item token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadItemId(u64);

impl UploadItemId {
    pub fn next() -> Self {
        UploadItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for UploadItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Queued,
    Uploading,
    Done { material_id: MaterialId },
    Error { message: String },
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Done { .. } | UploadStatus::Error { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadStatus::Queued => "queued",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Done { .. } => "done",
            UploadStatus::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid upload transition for item {item_id}: {from} -> {to}")]
pub struct TransitionError {
    pub item_id: UploadItemId,
    pub from: &'static str,
    pub to: &'static str,
}

/// One file in the visible upload queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub id: UploadItemId,
    pub file: FileDescriptor,
    pub status: UploadStatus,
    /// Requested visibility of the created material; only togglable once done
    pub is_public: bool,
    /// Set while a visibility change for this item is in flight
    pub visibility_updating: bool,
}

impl UploadItem {
    pub fn new(file: FileDescriptor) -> Self {
        Self {
            id: UploadItemId::next(),
            file,
            status: UploadStatus::Queued,
            is_public: false,
            visibility_updating: false,
        }
    }

    pub fn material_id(&self) -> Option<MaterialId> {
        match self.status {
            UploadStatus::Done { material_id } => Some(material_id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `queued → uploading`
    pub fn start(&mut self) -> Result<(), TransitionError> {
        match self.status {
            UploadStatus::Queued => {
                self.status = UploadStatus::Uploading;
                Ok(())
            }
            _ => Err(self.invalid("uploading")),
        }
    }

    /// `uploading → done`. The new material starts private, matching the
    /// visibility requested on authorize.
    pub fn complete(&mut self, material_id: MaterialId) -> Result<(), TransitionError> {
        match self.status {
            UploadStatus::Uploading => {
                self.status = UploadStatus::Done { material_id };
                self.is_public = false;
                self.visibility_updating = false;
                Ok(())
            }
            _ => Err(self.invalid("done")),
        }
    }

    /// `queued | uploading → error`
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        match self.status {
            UploadStatus::Queued | UploadStatus::Uploading => {
                self.status = UploadStatus::Error {
                    message: message.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid("error")),
        }
    }

    fn invalid(&self, to: &'static str) -> TransitionError {
        TransitionError {
            item_id: self.id,
            from: self.status.label(),
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> UploadItem {
        UploadItem::new(FileDescriptor::new("a.pdf", 10, "application/pdf"))
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let a = UploadItemId::next();
        let b = UploadItemId::next();
        assert!(b > a);
    }

    #[test]
    fn happy_path() {
        let mut item = item();
        assert_eq!(item.status, UploadStatus::Queued);
        assert_eq!(item.material_id(), None);

        item.start().unwrap();
        assert_eq!(item.status, UploadStatus::Uploading);
        assert!(!item.is_terminal());

        item.complete(42).unwrap();
        assert_eq!(item.material_id(), Some(42));
        assert_eq!(item.error(), None);
        assert!(item.is_terminal());
        assert!(!item.is_public);
    }

    #[test]
    fn failure_records_message() {
        let mut item = item();
        item.start().unwrap();
        item.fail("Storage upload failed: HTTP 403").unwrap();
        assert_eq!(item.error(), Some("Storage upload failed: HTTP 403"));
        assert_eq!(item.material_id(), None);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut done = item();
        done.start().unwrap();
        done.complete(1).unwrap();
        assert!(done.fail("late").is_err());
        assert!(done.start().is_err());
        assert!(done.complete(2).is_err());
        assert_eq!(done.material_id(), Some(1));

        let mut failed = item();
        failed.fail("boom").unwrap();
        let err = failed.complete(3).unwrap_err();
        assert_eq!(err.from, "error");
        assert_eq!(err.to, "done");
    }

    #[test]
    fn cannot_complete_without_starting() {
        let mut item = item();
        assert!(item.complete(1).is_err());
        assert_eq!(item.status, UploadStatus::Queued);
    }
}
