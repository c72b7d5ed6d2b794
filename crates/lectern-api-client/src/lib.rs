//! HTTP client for the Lectern materials API.
//!
//! Provides a minimal client with bearer-session auth, generic GET/POST/DELETE
//! helpers that map non-2xx responses to [`ApiError`], and the domain methods of
//! the [`MaterialApi`](lectern_core::MaterialApi) trait (see [`materials`]).

pub mod materials;

use anyhow::{Context, Result};
use lectern_core::{ApiError, ClientConfig};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Path of the materials endpoint, relative to the API base URL.
pub const MATERIAL_PATH: &str = "/material";

/// HTTP client for the materials API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_token: String,
}

impl ApiClient {
    pub fn new(base_url: String, session_token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.session_token.clone(),
            config.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.session_token)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(transport_error)?;
        read_json(ensure_success(response).await?).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send_post(path, body).await?;
        read_json(response).await
    }

    /// POST JSON body; any 2xx counts as success and the body is ignored.
    pub async fn post_json_no_content<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send_post(path, body).await.map(|_| ())
    }

    /// DELETE request with a JSON body. Returns Ok(()) on any 2xx.
    pub async fn delete_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)).json(body));
        let response = request.send().await.map_err(transport_error)?;
        ensure_success(response).await.map(|_| ())
    }

    async fn send_post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = request.send().await.map_err(transport_error)?;
        ensure_success(response).await
    }

    /// Raw client for requests that must not carry the session credentials
    /// (presigned storage uploads).
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a non-2xx response to [`ApiError::Status`], reading the body for the
/// server's `error`/`message` field.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(ApiError::from)
}

pub(crate) fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

// Re-export domain types for convenience.
pub use lectern_core::models::{Material, MaterialSource, PresignedUpload, Visibility};
