//! Ticket and status-history entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::{StatusHistoryEntry, Ticket, TicketStatus};

/// Database row mapping for the chamados table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEntity {
    pub id: Uuid,
    pub codigo: String,
    pub protocolo: String,
    pub solicitante: String,
    pub cargo: String,
    pub email: String,
    pub telefone: String,
    pub unidade: String,
    pub problema: String,
    pub internet_item: Option<String>,
    pub descricao: Option<String>,
    pub data_visita: Option<NaiveDate>,
    pub status: String,
    pub prioridade: String,
    pub data_abertura: DateTime<Utc>,
    pub data_primeira_resposta: Option<DateTime<Utc>>,
    pub data_conclusao: Option<DateTime<Utc>>,
    pub usuario_id: Option<Uuid>,
}

impl From<TicketEntity> for Ticket {
    fn from(entity: TicketEntity) -> Self {
        Self {
            id: entity.id,
            codigo: entity.codigo,
            protocolo: entity.protocolo,
            solicitante: entity.solicitante,
            cargo: entity.cargo,
            email: entity.email,
            telefone: entity.telefone,
            unidade: entity.unidade,
            problema: entity.problema,
            internet_item: entity.internet_item,
            descricao: entity.descricao,
            data_visita: entity.data_visita,
            // Rows written before normalization existed may carry loose
            // labels; fall back rather than failing the read.
            status: TicketStatus::from_str(&entity.status).unwrap_or(TicketStatus::Aberto),
            prioridade: entity.prioridade,
            data_abertura: entity.data_abertura,
            data_primeira_resposta: entity.data_primeira_resposta,
            data_conclusao: entity.data_conclusao,
            usuario_id: entity.usuario_id,
        }
    }
}

/// Database row mapping for the chamado_status_historico table.
#[derive(Debug, Clone, FromRow)]
pub struct StatusHistoryEntity {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub status_anterior: String,
    pub status_novo: String,
    pub alterado_por: Option<String>,
    pub alterado_em: DateTime<Utc>,
}

impl From<StatusHistoryEntity> for StatusHistoryEntry {
    fn from(entity: StatusHistoryEntity) -> Self {
        Self {
            id: entity.id,
            chamado_id: entity.chamado_id,
            status_anterior: entity.status_anterior,
            status_novo: entity.status_novo,
            alterado_por: entity.alterado_por,
            alterado_em: entity.alterado_em,
        }
    }
}
