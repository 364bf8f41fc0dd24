//! Attachment (anexo) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored attachment. Content lives in the database; `caminho_arquivo`
/// holds the synthetic API path a client downloads it from.
///
/// Every attachment belongs to exactly one ticket. `ticket_id` is set only
/// when the file arrived with a follow-up message; it is null for files
/// attached at ticket creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
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

/// Attachment metadata without content, as embedded in list responses and
/// history feed entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachmentMeta {
    pub id: Option<Uuid>,
    pub nome_original: String,
    pub caminho_arquivo: String,
    pub tipo_mime: Option<String>,
    pub tamanho_bytes: Option<i64>,
}

impl From<&Attachment> for AttachmentMeta {
    fn from(a: &Attachment) -> Self {
        Self {
            id: Some(a.id),
            nome_original: a.nome_original.clone(),
            caminho_arquivo: a.caminho_arquivo.clone(),
            tipo_mime: a.tipo_mime.clone(),
            tamanho_bytes: Some(a.tamanho_bytes),
        }
    }
}

/// One uploaded file, before persistence.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub nome_original: String,
    pub tipo_mime: Option<String>,
    pub conteudo: Vec<u8>,
}

impl AttachmentUpload {
    /// Stored filename: upload timestamp prefix plus the original name,
    /// keeping names collision-free without renaming what the user sees.
    pub fn stored_name(&self, at: DateTime<Utc>) -> String {
        format!("{}_{}", at.format("%Y%m%d%H%M%S%3f"), self.nome_original)
    }
}

/// The API path an attachment is served from once it has an identifier.
pub fn download_path(id: Uuid) -> String {
    format!("/api/v1/anexos/{}/download", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stored_name_has_timestamp_prefix() {
        let upload = AttachmentUpload {
            nome_original: "laudo.pdf".to_string(),
            tipo_mime: Some("application/pdf".to_string()),
            conteudo: vec![1, 2, 3],
        };
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 2).unwrap();
        let name = upload.stored_name(at);
        assert!(name.starts_with("20260105143002"));
        assert!(name.ends_with("_laudo.pdf"));
    }

    #[test]
    fn test_download_path_shape() {
        let id = Uuid::new_v4();
        assert_eq!(download_path(id), format!("/api/v1/anexos/{}/download", id));
    }
}
