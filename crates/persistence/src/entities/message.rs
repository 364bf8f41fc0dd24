//! Follow-up message entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::TicketMessage;

/// Database row mapping for the tickets table (follow-up sends).
#[derive(Debug, Clone, FromRow)]
pub struct TicketMessageEntity {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub assunto: String,
    pub mensagem: String,
    pub destinatarios: String,
    pub enviado_por: Option<String>,
    pub enviado_em: DateTime<Utc>,
}

impl From<TicketMessageEntity> for TicketMessage {
    fn from(entity: TicketMessageEntity) -> Self {
        Self {
            id: entity.id,
            chamado_id: entity.chamado_id,
            assunto: entity.assunto,
            mensagem: entity.mensagem,
            destinatarios: entity.destinatarios,
            enviado_por: entity.enviado_por,
            enviado_em: entity.enviado_em,
        }
    }
}
