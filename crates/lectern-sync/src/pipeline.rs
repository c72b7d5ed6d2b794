//! The three-step upload protocol for a single file.

use bytes::Bytes;
use lectern_core::models::{CourseId, FileDescriptor, Material, Visibility};
use lectern_core::{MaterialApi, UploadError, UploadStep, UploadStepExt};

/// Authorize, transfer straight to storage, then confirm. New materials are
/// always created private; the first failing step ends the attempt and nothing
/// is retried.
#[tracing::instrument(skip(api, content), fields(file = %file.name, size = file.size))]
pub async fn run_protocol(
    api: &dyn MaterialApi,
    course_id: CourseId,
    file: &FileDescriptor,
    content: Bytes,
) -> Result<Material, UploadError> {
    let presigned = api
        .request_upload(course_id, file, Visibility::Private)
        .await
        .at_step(UploadStep::Authorize)?;

    api.transfer(&presigned, file, content)
        .await
        .at_step(UploadStep::Transfer)?;

    let material = api
        .confirm_upload(course_id, &presigned.storage_key, file, Visibility::Private)
        .await
        .at_step(UploadStep::Confirm)?;

    tracing::debug!(material_id = material.id, "Upload confirmed");
    Ok(material)
}
