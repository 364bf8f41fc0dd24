//! Ticket (chamado) endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    AttachmentMeta, CreateTicketInput, DeleteTicketInput, SendTicketInput, StatusHistoryEntry,
    Ticket, TicketMessage, UpdateStatusInput,
};
use domain::services::{assemble_feed, within_correlation_window, HistoryEvent, HistoryEventKind};
use domain::services::{normalize, transition_stamps};
use persistence::repositories::{
    AttachmentRepository, LegacyAttachmentAdapter, MessageRepository, NewTicket, TicketRepository,
    UserRepository,
};
use shared::pagination::clamp_limit;
use shared::password::verify_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::anexos::{collect_uploads, MultipartFields};
use crate::services::email::{EmailAttachment, EmailMessage};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/chamados
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTicketInput>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    input.validate()?;
    let data_visita = input.parse_visita().map_err(ApiError::Validation)?;

    let novo = NewTicket {
        solicitante: input.solicitante,
        cargo: input.cargo,
        email: input.email,
        telefone: input.telefone,
        unidade: input.unidade,
        problema: input.problema,
        internet_item: input.internet_item,
        descricao: input.descricao,
        data_visita,
        usuario_id: None,
    };

    let entity = TicketRepository::new(state.pool.clone()).create(&novo).await?;
    let ticket: Ticket = entity.into();

    state.fanout().ticket_created(&ticket).await;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /api/v1/chamados
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let limit = clamp_limit(query.limit);
    let tickets = TicketRepository::new(state.pool.clone())
        .list(limit)
        .await?
        .into_iter()
        .map(Ticket::from)
        .collect();
    Ok(Json(tickets))
}

/// GET /api/v1/chamados/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ApiError> {
    let entity = TicketRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?;
    Ok(Json(entity.into()))
}

/// PATCH /api/v1/chamados/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<Ticket>, ApiError> {
    input.validate()?;

    let repo = TicketRepository::new(state.pool.clone());
    let current: Ticket = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?
        .into();

    let novo = normalize(&input.status);
    let anterior = current.status;
    let agora = Utc::now();
    let stamps = transition_stamps(anterior, novo, current.data_primeira_resposta, agora);

    let updated: Ticket = repo
        .update_status(
            id,
            anterior.as_str(),
            novo.as_str(),
            stamps,
            input.alterado_por.as_deref(),
            agora,
        )
        .await?
        .into();

    state
        .fanout()
        .ticket_status_changed(&updated, anterior.as_str())
        .await;

    Ok(Json(updated))
}

/// DELETE /api/v1/chamados/:id
///
/// Destructive, so the body must carry valid credentials of an existing
/// account. Wrong credentials leave the ticket untouched.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DeleteTicketInput>,
) -> Result<StatusCode, ApiError> {
    input.validate()?;

    let account = UserRepository::new(state.pool.clone())
        .find_by_usuario_or_email(&input.usuario)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Credenciais inválidas".into()))?;

    let valid = verify_password(&input.senha, &account.senha_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::Unauthorized("Credenciais inválidas".into()));
    }

    let repo = TicketRepository::new(state.pool.clone());
    let ticket: Ticket = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?
        .into();

    if repo.delete(id).await? {
        state.fanout().ticket_deleted(&ticket).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chamados/:id/tickets
///
/// Sends a follow-up message with optional file attachments. The message
/// row and its attachments are persisted first; the outbound e-mail is a
/// contained side effect.
pub async fn send_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let ticket: Ticket = TicketRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?
        .into();

    let MultipartFields { fields, uploads } =
        collect_uploads(multipart, &state.config.limits).await?;

    let input = SendTicketInput {
        assunto: fields.get("assunto").cloned().unwrap_or_default(),
        mensagem: fields.get("mensagem").cloned().unwrap_or_default(),
        destinatarios: fields.get("destinatarios").cloned().unwrap_or_default(),
        enviado_por: fields.get("enviado_por").cloned(),
    };
    input.validate()?;

    let message: TicketMessage = MessageRepository::new(state.pool.clone())
        .insert(
            id,
            &input.assunto,
            &input.mensagem,
            &input.destinatarios,
            input.enviado_por.as_deref(),
        )
        .await?
        .into();

    let saved = AttachmentRepository::new(state.pool.clone())
        .insert_many(id, Some(message.id), &uploads, None)
        .await;
    let anexos: Vec<AttachmentMeta> = saved.iter().map(AttachmentMeta::from).collect();

    if state.email.is_enabled() {
        let email = state.email.clone();
        let body = format!(
            r#"<html><body style="font-family: Arial, sans-serif;">
<p>Mensagem referente ao chamado <b>{codigo}</b> ({problema}):</p>
<div style="white-space: pre-wrap;">{mensagem}</div>
</body></html>"#,
            codigo = ticket.codigo,
            problema = ticket.problema,
            mensagem = message.mensagem,
        );
        let outgoing = EmailMessage {
            to: message.destinatario_list(),
            subject: message.assunto.clone(),
            body_html: body,
            attachments: uploads
                .iter()
                .map(|u| EmailAttachment {
                    nome: u.nome_original.clone(),
                    tipo_mime: u
                        .tipo_mime
                        .clone()
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    conteudo: u.conteudo.clone(),
                })
                .collect(),
        };
        tokio::spawn(async move {
            if let Err(err) = email.send(outgoing).await {
                tracing::warn!(error = %err, "failed to send follow-up email");
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({"ticket": message, "anexos": anexos})),
    ))
}

/// Collapse a failed history sub-query into an empty slice. The feed is
/// assembled from whatever could be gathered; only the ticket lookup itself
/// may fail the request.
fn partial<T>(result: Result<Vec<T>, sqlx::Error>, source: &'static str) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::warn!(source, error = %err, "history sub-query failed, feed will be partial");
        Vec::new()
    })
}

/// GET /api/v1/chamados/:id/historico
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEvent>>, ApiError> {
    let ticket: Ticket = TicketRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chamado não encontrado".into()))?
        .into();

    let attachments = AttachmentRepository::new(state.pool.clone());
    let messages: Vec<TicketMessage> = partial(
        MessageRepository::new(state.pool.clone())
            .find_for_chamado(id)
            .await,
        "tickets",
    )
    .into_iter()
    .map(TicketMessage::from)
    .collect();
    let transitions: Vec<StatusHistoryEntry> = partial(
        TicketRepository::new(state.pool.clone()).list_history(id).await,
        "status_historico",
    )
    .into_iter()
    .map(StatusHistoryEntry::from)
    .collect();

    // Legacy rows carry no message FK; the time-proximity heuristic assigns
    // each to the message closest in time, or to the opening event.
    let legacy = LegacyAttachmentAdapter::new(state.pool.clone())
        .find_for_codigo(&ticket.codigo)
        .await;
    let mut legacy_by_message: Vec<Vec<AttachmentMeta>> = vec![Vec::new(); messages.len()];
    let mut legacy_abertura: Vec<AttachmentMeta> = Vec::new();
    for item in legacy {
        let closest = messages
            .iter()
            .enumerate()
            .filter(|(_, m)| within_correlation_window(m.enviado_em, item.data_upload))
            .min_by_key(|(_, m)| (item.data_upload - m.enviado_em).num_seconds().abs());
        match closest {
            Some((idx, _)) => legacy_by_message[idx].push(item.meta),
            None => legacy_abertura.push(item.meta),
        }
    }

    let mut events = Vec::new();

    let mut abertura_anexos: Vec<AttachmentMeta> =
        partial(attachments.find_for_chamado(id).await, "anexos_abertura")
            .iter()
            .map(AttachmentMeta::from)
            .collect();
    abertura_anexos.extend(legacy_abertura);
    events.push(HistoryEvent {
        t: ticket.data_abertura,
        tipo: HistoryEventKind::Abertura,
        label: format!("Chamado {} aberto por {}", ticket.codigo, ticket.solicitante),
        anexos: abertura_anexos,
    });

    if let Some(descricao) = &ticket.descricao {
        if !descricao.trim().is_empty() {
            events.push(HistoryEvent {
                t: ticket.data_abertura,
                tipo: HistoryEventKind::Descricao,
                label: descricao.clone(),
                anexos: vec![],
            });
        }
    }

    for transition in transitions {
        let label = match &transition.alterado_por {
            Some(autor) => format!(
                "{} → {} (por {})",
                transition.status_anterior, transition.status_novo, autor
            ),
            None => format!("{} → {}", transition.status_anterior, transition.status_novo),
        };
        events.push(HistoryEvent {
            t: transition.alterado_em,
            tipo: HistoryEventKind::Status,
            label,
            anexos: vec![],
        });
    }

    for (idx, message) in messages.iter().enumerate() {
        let mut anexos: Vec<AttachmentMeta> =
            partial(attachments.find_for_ticket(message.id).await, "anexos_ticket")
                .iter()
                .map(AttachmentMeta::from)
                .collect();
        anexos.extend(std::mem::take(&mut legacy_by_message[idx]));
        events.push(HistoryEvent {
            t: message.enviado_em,
            tipo: HistoryEventKind::Ticket,
            label: format!(
                "Ticket \"{}\" enviado para {}",
                message.assunto, message.destinatarios
            ),
            anexos,
        });
    }

    Ok(Json(assemble_feed(events)))
}
