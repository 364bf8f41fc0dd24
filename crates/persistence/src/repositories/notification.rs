//! Notification repository.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::CreateNotificationInput;

use crate::entities::NotificationEntity;
use crate::metrics::QueryTimer;

const NOTIFICATION_COLUMNS: &str = "id, tipo, titulo, mensagem, recurso, recurso_id, acao, \
     payload, usuario_id, lido, lido_em, criado_em";

/// Repository for durable notification rows.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        input: &CreateNotificationInput,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_notificacao");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            INSERT INTO notificacoes
                (tipo, titulo, mensagem, recurso, recurso_id, acao, payload, usuario_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(&input.tipo)
        .bind(&input.titulo)
        .bind(&input.mensagem)
        .bind(&input.recurso)
        .bind(&input.recurso_id)
        .bind(&input.acao)
        .bind(&input.payload)
        .bind(input.usuario_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Recent notifications, newest first. Rows addressed to a specific
    /// user are visible only to that user; broadcast rows to everyone.
    pub async fn list(
        &self,
        usuario_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notificacoes");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            "SELECT {} FROM notificacoes \
             WHERE usuario_id IS NULL OR usuario_id = $1 \
             ORDER BY criado_em DESC LIMIT $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(usuario_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark one notification read. Returns the updated row, or `None` when
    /// the id does not exist or is not visible to the user.
    pub async fn mark_read(
        &self,
        id: Uuid,
        usuario_id: Uuid,
    ) -> Result<Option<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_notificacao_read");
        let result = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            UPDATE notificacoes
            SET lido = TRUE, lido_em = COALESCE(lido_em, NOW())
            WHERE id = $1 AND (usuario_id IS NULL OR usuario_id = $2)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
