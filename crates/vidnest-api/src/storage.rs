use std::path::PathBuf;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use vidnest_types::api::UploadResponse;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult, parse_id};
use crate::response::ApiResponse;

/// 20 MB upload limit for media blobs
const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Local stand-in for the object-storage collaborator: uploads are stored
/// under a media directory keyed by uuid and resolved to served URLs when a
/// video is created.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn store(&self, id: Uuid, bytes: Bytes) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .context("creating media directory")?;

        let path = self.root.join(id.to_string());
        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("creating media file {}", path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("writing media file {}", path.display()))?;

        Ok(())
    }

    /// Resolves an upload reference to its served URL. The reference must
    /// point at a stored blob.
    pub async fn resolve(&self, reference: Uuid) -> anyhow::Result<String> {
        let path = self.root.join(reference.to_string());
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(format!("/api/media/{}", reference)),
            Ok(false) => anyhow::bail!("upload {} not found", reference),
            Err(e) => Err(e).context("probing media file"),
        }
    }

    async fn read(&self, reference: Uuid) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.root.join(reference.to_string())).await
    }
}

/// POST /api/uploads — accepts raw bytes (application/octet-stream), stores
/// them under the media dir, returns the upload reference for video creation.
pub async fn upload(
    State(state): State<AppState>,
    bytes: Bytes,
) -> ApiResult<ApiResponse<UploadResponse>> {
    if bytes.is_empty() {
        return Err(ApiError::invalid("Upload body is empty"));
    }

    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::invalid("File exceeds the upload limit"));
    }

    let upload_id = Uuid::new_v4();
    let size = bytes.len() as u64;

    state
        .media
        .store(upload_id, bytes)
        .await
        .map_err(|e| ApiError::upstream(format!("Upload failed: {e}")))?;

    Ok(ApiResponse::created(
        "File uploaded successfully",
        UploadResponse { upload_id, size },
    ))
}

/// GET /api/media/{id} — serves a stored blob back.
pub async fn download(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    // uuid parse doubles as a path traversal guard
    let reference = parse_id(&media_id, "Invalid media ID")?;

    let bytes = state
        .media
        .read(reference)
        .await
        .map_err(|_| ApiError::not_found("Media not found"))?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}
