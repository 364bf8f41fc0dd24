//! Follow-up message repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TicketMessageEntity;
use crate::metrics::QueryTimer;

const MESSAGE_COLUMNS: &str =
    "id, chamado_id, assunto, mensagem, destinatarios, enviado_por, enviado_em";

/// Repository for the tickets table (follow-up messages sent out of a
/// chamado).
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        chamado_id: Uuid,
        assunto: &str,
        mensagem: &str,
        destinatarios: &str,
        enviado_por: Option<&str>,
    ) -> Result<TicketMessageEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_ticket");
        let result = sqlx::query_as::<_, TicketMessageEntity>(&format!(
            r#"
            INSERT INTO tickets (chamado_id, assunto, mensagem, destinatarios, enviado_por)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(chamado_id)
        .bind(assunto)
        .bind(mensagem)
        .bind(destinatarios)
        .bind(enviado_por)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Messages sent from a ticket, oldest first.
    pub async fn find_for_chamado(
        &self,
        chamado_id: Uuid,
    ) -> Result<Vec<TicketMessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_tickets_for_chamado");
        let result = sqlx::query_as::<_, TicketMessageEntity>(&format!(
            "SELECT {} FROM tickets WHERE chamado_id = $1 ORDER BY enviado_em ASC",
            MESSAGE_COLUMNS
        ))
        .bind(chamado_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
