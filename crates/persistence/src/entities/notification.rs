//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Notification;

/// Database row mapping for the notificacoes table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub tipo: String,
    pub titulo: String,
    pub mensagem: String,
    pub recurso: String,
    pub recurso_id: String,
    pub acao: String,
    pub payload: serde_json::Value,
    pub usuario_id: Option<Uuid>,
    pub lido: bool,
    pub lido_em: Option<DateTime<Utc>>,
    pub criado_em: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            tipo: entity.tipo,
            titulo: entity.titulo,
            mensagem: entity.mensagem,
            recurso: entity.recurso,
            recurso_id: entity.recurso_id,
            acao: entity.acao,
            payload: entity.payload,
            usuario_id: entity.usuario_id,
            lido: entity.lido,
            lido_em: entity.lido_em,
            criado_em: entity.criado_em,
        }
    }
}
