//! Materials API trait
//!
//! The network seam of the upload and sync engine. Every method is one request
//! against the materials endpoint or the storage backend; implementations do not
//! retry.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ApiError;
use crate::models::{
    CourseId, FileDescriptor, Material, MaterialId, PresignedUpload, Visibility,
};

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait MaterialApi: Send + Sync {
    /// Ask the server for a time-limited direct-upload authorization.
    async fn request_upload(
        &self,
        course_id: CourseId,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<PresignedUpload>;

    /// Post the file straight to the storage endpoint as a multipart form: the
    /// authorization fields first, the file content as the last part.
    async fn transfer(
        &self,
        presigned: &PresignedUpload,
        file: &FileDescriptor,
        content: Bytes,
    ) -> ApiResult<()>;

    /// Create the durable material record for an object already in storage.
    async fn confirm_upload(
        &self,
        course_id: CourseId,
        storage_key: &str,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<Material>;

    async fn update_visibility(
        &self,
        material_id: MaterialId,
        visibility: Visibility,
    ) -> ApiResult<()>;

    /// Authoritative list of the course's materials visible to the caller.
    async fn list_materials(&self, course_id: CourseId) -> ApiResult<Vec<Material>>;

    async fn delete_material(&self, course_id: CourseId, material_id: MaterialId)
        -> ApiResult<()>;
}
