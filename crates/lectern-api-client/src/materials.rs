//! Domain methods for the materials API.
//!
//! `POST /material` multiplexes request/confirm/visibility through its `action`
//! field; listing and deletion use `GET`/`DELETE` on the same path. The storage
//! transfer goes to the presigned URL without the session credentials.

use async_trait::async_trait;
use bytes::Bytes;
use lectern_core::models::{
    CourseId, DeleteMaterialRequest, FileDescriptor, Material, MaterialAction, MaterialEnvelope,
    MaterialId, MaterialListResponse, PresignedUpload, Visibility,
};
use lectern_core::{ApiError, ApiResult, MaterialApi};
use reqwest::multipart::{Form, Part};

use crate::{ensure_success, transport_error, ApiClient, MATERIAL_PATH};

/// Name of the multipart part holding the file content. Always sent last.
pub const FILE_FIELD: &str = "file";

/// Build the storage form: every authorization field, then the file part.
pub fn storage_form(
    presigned: &PresignedUpload,
    file: &FileDescriptor,
    content: Bytes,
) -> ApiResult<Form> {
    let mut form = Form::new();
    for (name, value) in &presigned.fields {
        form = form.text(name.clone(), value.clone());
    }

    let part = Part::bytes(content.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.media_type)
        .map_err(|e| {
            ApiError::InvalidInput(format!("media type '{}': {}", file.media_type, e))
        })?;

    Ok(form.part(FILE_FIELD, part))
}

#[async_trait]
impl MaterialApi for ApiClient {
    #[tracing::instrument(skip(self, file), fields(filename = %file.name))]
    async fn request_upload(
        &self,
        course_id: CourseId,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<PresignedUpload> {
        let body = MaterialAction::RequestUpload {
            course_id,
            filename: file.name.clone(),
            file_type: file.media_type.clone(),
            visibility,
        };
        self.post_json(MATERIAL_PATH, &body).await
    }

    #[tracing::instrument(skip(self, presigned, file, content), fields(filename = %file.name, bytes = content.len()))]
    async fn transfer(
        &self,
        presigned: &PresignedUpload,
        file: &FileDescriptor,
        content: Bytes,
    ) -> ApiResult<()> {
        let form = storage_form(presigned, file, content)?;

        let response = self
            .client()
            .post(&presigned.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        // 204 is the usual answer of presigned POST policies; any 2xx is accepted.
        ensure_success(response).await.map(|_| ())
    }

    #[tracing::instrument(skip(self, file), fields(filename = %file.name))]
    async fn confirm_upload(
        &self,
        course_id: CourseId,
        storage_key: &str,
        file: &FileDescriptor,
        visibility: Visibility,
    ) -> ApiResult<Material> {
        let body = MaterialAction::ConfirmUpload {
            storage_key: storage_key.to_string(),
            course_id,
            filename: file.name.clone(),
            file_type: file.media_type.clone(),
            visibility,
        };
        let envelope: MaterialEnvelope = self.post_json(MATERIAL_PATH, &body).await?;
        Ok(envelope.material)
    }

    #[tracing::instrument(skip(self))]
    async fn update_visibility(
        &self,
        material_id: MaterialId,
        visibility: Visibility,
    ) -> ApiResult<()> {
        let body = MaterialAction::UpdateVisibility {
            material_id,
            visibility,
        };
        self.post_json_no_content(MATERIAL_PATH, &body).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_materials(&self, course_id: CourseId) -> ApiResult<Vec<Material>> {
        let response: MaterialListResponse = self
            .get(MATERIAL_PATH, &[("course_id", course_id.to_string())])
            .await?;
        Ok(response.materials)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_material(
        &self,
        course_id: CourseId,
        material_id: MaterialId,
    ) -> ApiResult<()> {
        let body = DeleteMaterialRequest {
            material_id,
            course_id,
        };
        self.delete_json(MATERIAL_PATH, &body).await
    }
}
