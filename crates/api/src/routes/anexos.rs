//! Attachment upload and download endpoints.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use uuid::Uuid;

use domain::models::{AttachmentMeta, AttachmentUpload};
use persistence::repositories::{AttachmentRepository, TicketRepository};

use crate::app::AppState;
use crate::config::LimitsConfig;
use crate::error::ApiError;

/// Text fields and file parts of one multipart request.
pub struct MultipartFields {
    pub fields: HashMap<String, String>,
    pub uploads: Vec<AttachmentUpload>,
}

/// Drains a multipart body into text fields and uploads, enforcing the
/// configured per-file size and batch count limits.
pub async fn collect_uploads(
    mut multipart: Multipart,
    limits: &LimitsConfig,
) -> Result<MultipartFields, ApiError> {
    let mut fields = HashMap::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Upload inválido: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) if !file_name.is_empty() => {
                if uploads.len() >= limits.max_attachments_per_upload {
                    return Err(ApiError::Validation(format!(
                        "Máximo de {} anexos por envio",
                        limits.max_attachments_per_upload
                    )));
                }
                let tipo_mime = field.content_type().map(str::to_string);
                let conteudo = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Upload inválido: {}", e)))?
                    .to_vec();
                if conteudo.len() > limits.max_attachment_bytes {
                    return Err(ApiError::Validation(format!(
                        "Anexo {} excede o limite de {} bytes",
                        file_name, limits.max_attachment_bytes
                    )));
                }
                uploads.push(AttachmentUpload {
                    nome_original: file_name,
                    tipo_mime,
                    conteudo,
                });
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Campo inválido: {}", e)))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(MultipartFields { fields, uploads })
}

/// POST /api/v1/chamados/:id/anexos
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<AttachmentMeta>>), ApiError> {
    TicketRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?;

    let MultipartFields { uploads, .. } =
        collect_uploads(multipart, &state.config.limits).await?;
    if uploads.is_empty() {
        return Err(ApiError::Validation("Nenhum arquivo enviado".into()));
    }

    let saved = AttachmentRepository::new(state.pool.clone())
        .insert_many(id, None, &uploads, None)
        .await;
    if saved.is_empty() {
        return Err(ApiError::Internal("Nenhum anexo pôde ser salvo".into()));
    }
    let metas: Vec<AttachmentMeta> = saved.iter().map(AttachmentMeta::from).collect();
    Ok((StatusCode::CREATED, Json(metas)))
}

/// GET /api/v1/anexos/:id/download
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let content = AttachmentRepository::new(state.pool.clone())
        .find_content(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Anexo não encontrado".into()))?;

    let mut headers = HeaderMap::new();
    let mime = content
        .tipo_mime
        .unwrap_or_else(|| "application/octet-stream".to_string());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    // Filename quoted so spaces and accents survive the header.
    let disposition = format!(
        "attachment; filename=\"{}\"",
        content.nome_original.replace('"', "")
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((headers, content.conteudo))
}
