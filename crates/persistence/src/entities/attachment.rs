//! Attachment entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Attachment, AttachmentMeta};

/// Database row mapping for the chamado_anexos table, without content.
///
/// Content is fetched separately (only by the download endpoint) so listing
/// and history assembly never drag blobs through the pool.
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentEntity {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub nome_original: String,
    pub nome_arquivo: String,
    pub caminho_arquivo: String,
    pub tipo_mime: Option<String>,
    pub tamanho_bytes: i64,
    pub hash_sha256: String,
    pub data_upload: DateTime<Utc>,
    pub usuario_id: Option<Uuid>,
}

impl From<AttachmentEntity> for Attachment {
    fn from(entity: AttachmentEntity) -> Self {
        Self {
            id: entity.id,
            chamado_id: entity.chamado_id,
            ticket_id: entity.ticket_id,
            nome_original: entity.nome_original,
            nome_arquivo: entity.nome_arquivo,
            caminho_arquivo: entity.caminho_arquivo,
            tipo_mime: entity.tipo_mime,
            tamanho_bytes: entity.tamanho_bytes,
            hash_sha256: entity.hash_sha256,
            data_upload: entity.data_upload,
            usuario_id: entity.usuario_id,
        }
    }
}

impl From<&AttachmentEntity> for AttachmentMeta {
    fn from(entity: &AttachmentEntity) -> Self {
        Self {
            id: Some(entity.id),
            nome_original: entity.nome_original.clone(),
            caminho_arquivo: entity.caminho_arquivo.clone(),
            tipo_mime: entity.tipo_mime.clone(),
            tamanho_bytes: Some(entity.tamanho_bytes),
        }
    }
}

/// Row with the stored bytes, used by the download endpoint.
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentContentEntity {
    pub id: Uuid,
    pub nome_original: String,
    pub tipo_mime: Option<String>,
    pub conteudo: Vec<u8>,
}
