//! Attachment repository for database operations.

use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use domain::models::attachment::download_path;
use domain::models::AttachmentUpload;
use shared::crypto::sha256_hex;

use crate::entities::{AttachmentContentEntity, AttachmentEntity};
use crate::metrics::QueryTimer;

const ATTACHMENT_COLUMNS: &str = "id, chamado_id, ticket_id, nome_original, nome_arquivo, \
     caminho_arquivo, tipo_mime, tamanho_bytes, hash_sha256, data_upload, usuario_id";

/// Repository for attachment rows. Content bytes live in the same table but
/// are selected only by [`AttachmentRepository::find_content`].
#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one upload, hashing its content and filling the download
    /// path with the identifier the insert produced.
    pub async fn insert(
        &self,
        chamado_id: Uuid,
        ticket_id: Option<Uuid>,
        upload: &AttachmentUpload,
        usuario_id: Option<Uuid>,
    ) -> Result<AttachmentEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_anexo");
        let agora = Utc::now();
        let hash = sha256_hex(&upload.conteudo);
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO chamado_anexos
                (chamado_id, ticket_id, nome_original, nome_arquivo, tipo_mime,
                 tamanho_bytes, hash_sha256, conteudo, data_upload, usuario_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(chamado_id)
        .bind(ticket_id)
        .bind(&upload.nome_original)
        .bind(upload.stored_name(agora))
        .bind(&upload.tipo_mime)
        .bind(upload.conteudo.len() as i64)
        .bind(&hash)
        .bind(&upload.conteudo)
        .bind(agora)
        .bind(usuario_id)
        .fetch_one(&mut *tx)
        .await?;

        // The download path embeds the row id, so it can only be written
        // after the insert assigns one.
        let entity = sqlx::query_as::<_, AttachmentEntity>(&format!(
            "UPDATE chamado_anexos SET caminho_arquivo = $1 WHERE id = $2 RETURNING {}",
            ATTACHMENT_COLUMNS
        ))
        .bind(download_path(id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(entity)
    }

    /// Persist a batch of uploads. A failed file is logged and skipped so
    /// one bad upload never voids its siblings.
    pub async fn insert_many(
        &self,
        chamado_id: Uuid,
        ticket_id: Option<Uuid>,
        uploads: &[AttachmentUpload],
        usuario_id: Option<Uuid>,
    ) -> Vec<AttachmentEntity> {
        let mut saved = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.insert(chamado_id, ticket_id, upload, usuario_id).await {
                Ok(entity) => saved.push(entity),
                Err(err) => {
                    warn!(
                        %chamado_id,
                        nome = %upload.nome_original,
                        error = %err,
                        "failed to persist attachment, skipping"
                    );
                }
            }
        }
        saved
    }

    /// Fetch the stored bytes for a download.
    pub async fn find_content(
        &self,
        id: Uuid,
    ) -> Result<Option<AttachmentContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_anexo_content");
        let result = sqlx::query_as::<_, AttachmentContentEntity>(
            "SELECT id, nome_original, tipo_mime, conteudo FROM chamado_anexos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attachments that arrived at ticket creation (not tied to a
    /// follow-up message), oldest first.
    pub async fn find_for_chamado(
        &self,
        chamado_id: Uuid,
    ) -> Result<Vec<AttachmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_anexos_for_chamado");
        let result = sqlx::query_as::<_, AttachmentEntity>(&format!(
            "SELECT {} FROM chamado_anexos \
             WHERE chamado_id = $1 AND ticket_id IS NULL ORDER BY data_upload ASC",
            ATTACHMENT_COLUMNS
        ))
        .bind(chamado_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attachments carried by a specific follow-up message.
    pub async fn find_for_ticket(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<AttachmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_anexos_for_ticket");
        let result = sqlx::query_as::<_, AttachmentEntity>(&format!(
            "SELECT {} FROM chamado_anexos WHERE ticket_id = $1 ORDER BY data_upload ASC",
            ATTACHMENT_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
