//! Test helpers for the sync engine
//!
//! `FakeApi` is an in-memory materials server with scripted failures. It yields
//! to the scheduler between steps so concurrent uploads actually interleave.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use lectern_core::models::{
    CourseId, FileDescriptor, Material, MaterialId, MaterialSource, PresignedUpload, UserId,
    Visibility,
};
use lectern_core::{ApiError, ApiResult, MaterialApi, UploadPolicy, UploadStep};
use lectern_sync::{MaterialsSession, PendingFile, UploadEvent};
use tokio::sync::{mpsc, Notify};

pub const COURSE_ID: CourseId = 42;
pub const ME: UserId = 7;
pub const SOMEONE_ELSE: UserId = 8;
pub const FIRST_MATERIAL_ID: MaterialId = 100;

#[derive(Default)]
struct FakeState {
    next_material_id: MaterialId,
    materials: Vec<Material>,
    upload_failures: HashMap<String, (UploadStep, ApiError)>,
    held_transfers: HashMap<String, Arc<Notify>>,
    held_visibility: HashMap<MaterialId, Arc<Notify>>,
    failing_visibility: HashSet<MaterialId>,
    listing_fails: bool,
    deletes_hang: bool,
    deletes_fail: bool,
    calls: Vec<String>,
    visibility_requests: Vec<(MaterialId, Visibility)>,
    delete_requests: Vec<MaterialId>,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_material_id: FIRST_MATERIAL_ID,
                ..Default::default()
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Make the upload of `filename` fail at `step` with a server error.
    pub fn fail_upload(&self, filename: &str, step: UploadStep, status: u16, message: &str) {
        let error = ApiError::Status {
            status,
            message: message.to_string(),
        };
        self.with(|s| s.upload_failures.insert(filename.to_string(), (step, error)));
    }

    /// Block the storage transfer of `filename` until the returned handle is notified.
    pub fn hold_transfer(&self, filename: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.held_transfers.insert(filename.to_string(), gate.clone()));
        gate
    }

    /// Block visibility updates of `material_id` until the returned handle is
    /// notified. The server applies the change only after release.
    pub fn hold_visibility(&self, material_id: MaterialId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.held_visibility.insert(material_id, gate.clone()));
        gate
    }

    pub fn remote_visibility(&self, material_id: MaterialId) -> Option<Visibility> {
        self.with(|s| {
            s.materials
                .iter()
                .find(|m| m.id == material_id)
                .map(|m| m.visibility)
        })
    }

    pub fn fail_visibility(&self, material_id: MaterialId) {
        self.with(|s| s.failing_visibility.insert(material_id));
    }

    pub fn fail_listing(&self, fails: bool) {
        self.with(|s| s.listing_fails = fails);
    }

    pub fn hang_deletes(&self) {
        self.with(|s| s.deletes_hang = true);
    }

    pub fn fail_deletes(&self) {
        self.with(|s| s.deletes_fail = true);
    }

    pub fn seed(&self, material: Material) {
        self.with(|s| s.materials.push(material));
    }

    /// Drop a material server-side without telling any session.
    pub fn remove_remote(&self, material_id: MaterialId) {
        self.with(|s| s.materials.retain(|m| m.id != material_id));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn visibility_requests(&self) -> Vec<(MaterialId, Visibility)> {
        self.with(|s| s.visibility_requests.clone())
    }

    pub fn delete_requests(&self) -> Vec<MaterialId> {
        self.with(|s| s.delete_requests.clone())
    }

    pub fn remote_ids(&self) -> Vec<MaterialId> {
        self.with(|s| s.materials.iter().map(|m| m.id).collect())
    }

    fn scripted_failure(&self, filename: &str, step: UploadStep) -> Option<ApiError> {
        self.with(|s| match s.upload_failures.get(filename) {
            Some((failing_step, error)) if *failing_step == step => Some(error.clone()),
            _ => None,
        })
    }

    fn record(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }
}

#[async_trait]
impl MaterialApi for FakeApi {
    async fn request_upload(
        &self,
        course_id: CourseId,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<PresignedUpload> {
        self.record(format!("authorize:{}:{}", file.name, visibility));
        tokio::task::yield_now().await;

        if let Some(error) = self.scripted_failure(&file.name, UploadStep::Authorize) {
            return Err(error);
        }

        let storage_key = format!("materials/{}/{}", course_id, file.name);
        Ok(PresignedUpload {
            upload_url: "https://storage.test/bucket".to_string(),
            fields: [("key", storage_key.clone())].into_iter().collect(),
            storage_key,
        })
    }

    async fn transfer(
        &self,
        presigned: &PresignedUpload,
        file: &FileDescriptor,
        content: Bytes,
    ) -> ApiResult<()> {
        self.record(format!("transfer:{}", file.name));
        assert_eq!(content.len() as u64, file.size);
        assert_eq!(presigned.fields.get("key"), Some(presigned.storage_key.as_str()));

        let gate = self.with(|s| s.held_transfers.get(&file.name).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        match self.scripted_failure(&file.name, UploadStep::Transfer) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn confirm_upload(
        &self,
        course_id: CourseId,
        storage_key: &str,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<Material> {
        self.record(format!("confirm:{}", file.name));
        tokio::task::yield_now().await;

        if let Some(error) = self.scripted_failure(&file.name, UploadStep::Confirm) {
            return Err(error);
        }

        Ok(self.with(|s| {
            let material = Material {
                id: s.next_material_id,
                name: file.name.clone(),
                media_type: file.media_type.clone(),
                download_url: Some(format!("https://storage.test/{}?signed", storage_key)),
                visibility,
                owner_id: ME,
                source: MaterialSource::Upload,
                course_id: Some(course_id),
                file_url: None,
                created_at: None,
                updated_at: None,
                updating: false,
            };
            s.next_material_id += 1;
            s.materials.push(material.clone());
            material
        }))
    }

    async fn update_visibility(
        &self,
        material_id: MaterialId,
        visibility: Visibility,
    ) -> ApiResult<()> {
        let gate = self.with(|s| {
            s.visibility_requests.push((material_id, visibility));
            s.held_visibility.get(&material_id).cloned()
        });
        if let Some(gate) = gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;

        self.with(|s| {
            if s.failing_visibility.contains(&material_id) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "Failed to update visibility".to_string(),
                });
            }
            if let Some(m) = s.materials.iter_mut().find(|m| m.id == material_id) {
                m.visibility = visibility;
            }
            Ok(())
        })
    }

    async fn list_materials(&self, _course_id: CourseId) -> ApiResult<Vec<Material>> {
        self.record("list".to_string());
        tokio::task::yield_now().await;

        self.with(|s| {
            if s.listing_fails {
                Err(ApiError::Transport("connection refused".to_string()))
            } else {
                Ok(s.materials.clone())
            }
        })
    }

    async fn delete_material(&self, _course_id: CourseId, material_id: MaterialId) -> ApiResult<()> {
        let (hang, fail) = self.with(|s| {
            s.delete_requests.push(material_id);
            (s.deletes_hang, s.deletes_fail)
        });

        if hang {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(ApiError::Status {
                status: 403,
                message: "Only the owner can delete this material".to_string(),
            });
        }

        self.with(|s| s.materials.retain(|m| m.id != material_id));
        Ok(())
    }
}

pub fn material(id: MaterialId, owner_id: UserId, source: MaterialSource) -> Material {
    Material {
        id,
        name: format!("material-{}.pdf", id),
        media_type: "application/pdf".to_string(),
        download_url: None,
        visibility: Visibility::Private,
        owner_id,
        source,
        course_id: Some(COURSE_ID),
        file_url: None,
        created_at: None,
        updated_at: None,
        updating: false,
    }
}

pub fn pdf(name: &str) -> PendingFile {
    PendingFile::new(name, "application/pdf", Bytes::from(format!("%PDF {}", name)))
}

pub fn session(api: Arc<FakeApi>, policy: UploadPolicy) -> MaterialsSession {
    MaterialsSession::new(api, COURSE_ID, Some(ME), policy)
}

pub fn session_with_events(
    api: Arc<FakeApi>,
    policy: UploadPolicy,
) -> (MaterialsSession, mpsc::UnboundedReceiver<UploadEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (session(api, policy).with_events(tx), rx)
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Highest number of items simultaneously in `uploading` according to an
/// event log.
pub fn peak_uploading(events: &[UploadEvent]) -> usize {
    let mut current = 0usize;
    let mut peak = 0usize;
    for event in events {
        match event {
            UploadEvent::Started { .. } => {
                current += 1;
                peak = peak.max(current);
            }
            UploadEvent::Completed { .. } | UploadEvent::Failed { .. } => {
                current = current.saturating_sub(1);
            }
            _ => {}
        }
    }
    peak
}
