//! Ticket repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use domain::services::identifier::{next_codigo, next_protocolo, MAX_IDENTIFIER_ATTEMPTS};
use domain::services::status::TransitionStamps;

use crate::entities::{StatusHistoryEntity, TicketEntity};
use crate::metrics::QueryTimer;

/// Advisory lock key serializing identifier generation across concurrent
/// ticket creations.
const IDENTIFIER_LOCK_KEY: i64 = 0x4348_414D;

/// Name of the pre-migration ticket table. Probed for historical `EVQ-`
/// codes; its absence is expected on fresh deployments.
const LEGACY_TICKETS_TABLE: &str = "chamados_legado";

const TICKET_COLUMNS: &str = "id, codigo, protocolo, solicitante, cargo, email, telefone, \
     unidade, problema, internet_item, descricao, data_visita, status, prioridade, \
     data_abertura, data_primeira_resposta, data_conclusao, usuario_id";

/// Error from ticket creation.
#[derive(Debug, Error)]
pub enum CreateTicketError {
    /// The bounded generate-check-insert loop ran out of attempts. The
    /// caller may retry the whole creation.
    #[error("Falha ao gerar identificadores do chamado")]
    IdentifierExhausted,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Fields of a ticket to be created; identifiers and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub solicitante: String,
    pub cargo: String,
    pub email: String,
    pub telefone: String,
    pub unidade: String,
    pub problema: String,
    pub internet_item: Option<String>,
    pub descricao: Option<String>,
    pub data_visita: Option<NaiveDate>,
    pub usuario_id: Option<Uuid>,
}

/// Repository for ticket and status-history database operations.
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a ticket, assigning the next `codigo` and `protocolo`.
    ///
    /// Generation is serialized by an advisory transaction lock so two
    /// concurrent creations cannot both compute the same max-plus-one pair;
    /// the unique constraints plus a bounded retry loop remain as backstop.
    pub async fn create(&self, novo: &NewTicket) -> Result<TicketEntity, CreateTicketError> {
        // The legacy table never gains rows anymore; probing it outside the
        // transaction keeps a missing-table error from aborting it.
        let legacy_codigos = self.legacy_codigos().await;
        let legacy_protocolos = self.legacy_protocolos().await;

        for attempt in 1..=MAX_IDENTIFIER_ATTEMPTS {
            let timer = QueryTimer::new("create_chamado");
            let mut tx = self.pool.begin().await?;

            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(IDENTIFIER_LOCK_KEY)
                .execute(&mut *tx)
                .await?;

            let mut codigos: Vec<String> =
                sqlx::query_scalar("SELECT codigo FROM chamados WHERE codigo LIKE 'EVQ-%'")
                    .fetch_all(&mut *tx)
                    .await?;
            codigos.extend(legacy_codigos.iter().cloned());

            let today = Utc::now().date_naive();
            let prefix = domain::services::identifier::protocolo_prefix(today);
            let mut protocolos: Vec<String> =
                sqlx::query_scalar("SELECT protocolo FROM chamados WHERE protocolo LIKE $1")
                    .bind(format!("{}-%", prefix))
                    .fetch_all(&mut *tx)
                    .await?;
            protocolos.extend(legacy_protocolos.iter().cloned());

            let codigo = next_codigo(codigos.iter().map(String::as_str));
            let protocolo = next_protocolo(today, protocolos.iter().map(String::as_str));

            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM chamados WHERE codigo = $1 OR protocolo = $2)",
            )
            .bind(&codigo)
            .bind(&protocolo)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                debug!(attempt, codigo, protocolo, "identifier pair already in use, retrying");
                tx.rollback().await.ok();
                continue;
            }

            let inserted = sqlx::query_as::<_, TicketEntity>(&format!(
                r#"
                INSERT INTO chamados
                    (codigo, protocolo, solicitante, cargo, email, telefone, unidade,
                     problema, internet_item, descricao, data_visita, status, prioridade)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'Aberto', 'Normal')
                RETURNING {}
                "#,
                TICKET_COLUMNS
            ))
            .bind(&codigo)
            .bind(&protocolo)
            .bind(&novo.solicitante)
            .bind(&novo.cargo)
            .bind(&novo.email)
            .bind(&novo.telefone)
            .bind(&novo.unidade)
            .bind(&novo.problema)
            .bind(&novo.internet_item)
            .bind(&novo.descricao)
            .bind(novo.data_visita)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(entity) => {
                    tx.commit().await?;
                    timer.record();
                    return Ok(entity);
                }
                Err(err) if is_unique_violation(&err) => {
                    warn!(attempt, codigo, protocolo, "identifier collision on insert, retrying");
                    tx.rollback().await.ok();
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(CreateTicketError::IdentifierExhausted)
    }

    async fn legacy_codigos(&self) -> Vec<String> {
        let query = format!(
            "SELECT codigo FROM {} WHERE codigo LIKE 'EVQ-%'",
            LEGACY_TICKETS_TABLE
        );
        match sqlx::query_scalar(&query).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(err) => {
                debug!(error = %err, "legacy ticket table not readable, skipping");
                Vec::new()
            }
        }
    }

    async fn legacy_protocolos(&self) -> Vec<String> {
        let query = format!("SELECT protocolo FROM {}", LEGACY_TICKETS_TABLE);
        match sqlx::query_scalar(&query).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(err) => {
                debug!(error = %err, "legacy ticket table not readable, skipping");
                Vec::new()
            }
        }
    }

    /// List tickets, newest first.
    pub async fn list(&self, limit: i64) -> Result<Vec<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_chamados");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            "SELECT {} FROM chamados ORDER BY data_abertura DESC LIMIT $1",
            TICKET_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chamado_by_id");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            "SELECT {} FROM chamados WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a status transition: update the ticket row (stamping
    /// first-response/conclusion per the computed stamps) and append the
    /// history row, atomically.
    pub async fn update_status(
        &self,
        id: Uuid,
        anterior: &str,
        novo: &str,
        stamps: TransitionStamps,
        alterado_por: Option<&str>,
        agora: DateTime<Utc>,
    ) -> Result<TicketEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_chamado_status");
        let mut tx = self.pool.begin().await?;

        // COALESCE keeps data_primeira_resposta write-once and re-stamps
        // data_conclusao only when the transition enters Concluído.
        let updated = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            UPDATE chamados
            SET status = $1,
                data_primeira_resposta = COALESCE(data_primeira_resposta, $2),
                data_conclusao = COALESCE($3, data_conclusao)
            WHERE id = $4
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(novo)
        .bind(stamps.data_primeira_resposta)
        .bind(stamps.data_conclusao)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO chamado_status_historico
                (chamado_id, status_anterior, status_novo, alterado_por, alterado_em)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(anterior)
        .bind(novo)
        .bind(alterado_por)
        .bind(agora)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Delete a ticket. Attachments, messages and history rows cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_chamado");
        let result = sqlx::query("DELETE FROM chamados WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Recorded status transitions for a ticket, oldest first.
    pub async fn list_history(
        &self,
        chamado_id: Uuid,
    ) -> Result<Vec<StatusHistoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_chamado_status_historico");
        let result = sqlx::query_as::<_, StatusHistoryEntity>(
            r#"
            SELECT id, chamado_id, status_anterior, status_novo, alterado_por, alterado_em
            FROM chamado_status_historico
            WHERE chamado_id = $1
            ORDER BY alterado_em ASC
            "#,
        )
        .bind(chamado_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
