//! Notification fan-out.
//!
//! Every ticket lifecycle event produces three effects: a durable
//! notification row, a realtime push and an e-mail. The row is the source
//! of truth; push and mail are best effort. None of them may fail the core
//! mutation that triggered them, so every failure here is logged and
//! contained.

use serde_json::json;
use tracing::warn;

use domain::models::{
    CreateNotificationInput, Ticket, TicketEvent, NOTIFICATION_CHANNEL,
};
use persistence::repositories::{NotificationRepository, UserRepository};

use crate::services::email::{build_status_updated, build_ticket_opened, EmailMessage};
use crate::services::{EmailService, RealtimeHub};

#[derive(Clone)]
pub struct NotificationFanout {
    notifications: NotificationRepository,
    users: UserRepository,
    hub: RealtimeHub,
    email: EmailService,
}

impl NotificationFanout {
    pub fn new(
        notifications: NotificationRepository,
        users: UserRepository,
        hub: RealtimeHub,
        email: EmailService,
    ) -> Self {
        Self {
            notifications,
            users,
            hub,
            email,
        }
    }

    pub async fn ticket_created(&self, ticket: &Ticket) {
        let payload = json!({
            "codigo": ticket.codigo,
            "protocolo": ticket.protocolo,
            "solicitante": ticket.solicitante,
            "problema": ticket.problema,
        });
        self.persist_and_push(
            TicketEvent::Created,
            format!("Novo chamado {}", ticket.codigo),
            format!("{} abriu um chamado: {}", ticket.solicitante, ticket.problema),
            ticket,
            payload,
        )
        .await;

        let (subject, body) = build_ticket_opened(ticket);
        self.send_mail(vec![ticket.email.clone()], subject, body);
    }

    pub async fn ticket_status_changed(&self, ticket: &Ticket, anterior: &str) {
        let payload = json!({
            "codigo": ticket.codigo,
            "status_anterior": anterior,
            "status_novo": ticket.status.as_str(),
        });
        self.persist_and_push(
            TicketEvent::StatusChanged,
            format!("Chamado {} atualizado", ticket.codigo),
            format!("Status alterado de {} para {}", anterior, ticket.status.as_str()),
            ticket,
            payload,
        )
        .await;

        let (subject, body) = build_status_updated(ticket, anterior);
        self.send_mail(vec![ticket.email.clone()], subject, body);
    }

    pub async fn ticket_deleted(&self, ticket: &Ticket) {
        let payload = json!({"codigo": ticket.codigo});
        self.persist_and_push(
            TicketEvent::Deleted,
            format!("Chamado {} excluído", ticket.codigo),
            format!("O chamado {} foi excluído", ticket.codigo),
            ticket,
            payload,
        )
        .await;
    }

    async fn persist_and_push(
        &self,
        event: TicketEvent,
        titulo: String,
        mensagem: String,
        ticket: &Ticket,
        payload: serde_json::Value,
    ) {
        let input = CreateNotificationInput {
            tipo: event.channel().to_string(),
            titulo,
            mensagem,
            recurso: "chamado".to_string(),
            recurso_id: ticket.codigo.clone(),
            acao: event.acao().to_string(),
            payload: payload.clone(),
            usuario_id: None,
        };

        match self.notifications.insert(&input).await {
            Ok(row) => {
                let notification =
                    serde_json::to_value(domain::models::Notification::from(row))
                        .unwrap_or_default();
                self.hub.emit(NOTIFICATION_CHANNEL, notification.clone());
                self.push_to_staff(notification).await;
            }
            Err(err) => {
                warn!(codigo = %ticket.codigo, error = %err, "failed to persist notification");
            }
        }

        self.hub.emit(event.channel(), payload);
    }

    /// Targeted push to the rooms of every active staff account. The global
    /// broadcast above already reached anonymous listeners; this one reaches
    /// staff sockets that only watch their own room.
    async fn push_to_staff(&self, notification: serde_json::Value) {
        match self.users.list_staff().await {
            Ok(staff) => {
                for member in staff {
                    self.hub
                        .emit_to_user(member.id, NOTIFICATION_CHANNEL, notification.clone())
                        .await;
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load staff accounts for targeted push");
            }
        }
    }

    /// Queue an e-mail without blocking the request. Also copies the IT
    /// team when an address is configured.
    fn send_mail(&self, mut to: Vec<String>, subject: String, body_html: String) {
        if !self.email.is_enabled() {
            return;
        }
        if let Some(ti) = self.email.ti_address() {
            to.push(ti.to_string());
        }
        let email = self.email.clone();
        tokio::spawn(async move {
            if let Err(err) = email
                .send(EmailMessage {
                    to,
                    subject: subject.clone(),
                    body_html,
                    attachments: vec![],
                })
                .await
            {
                warn!(subject = %subject, error = %err, "failed to send notification email");
            }
        });
    }
}
