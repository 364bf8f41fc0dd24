//! Notification domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable record of a domain event. The persisted row is the source of
/// truth; the realtime push carrying the same payload is only a UI hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
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

/// Input for persisting a notification row.
#[derive(Debug, Clone)]
pub struct CreateNotificationInput {
    pub tipo: String,
    pub titulo: String,
    pub mensagem: String,
    pub recurso: String,
    pub recurso_id: String,
    pub acao: String,
    pub payload: serde_json::Value,
    pub usuario_id: Option<Uuid>,
}

/// Ticket lifecycle events that fan out as notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEvent {
    Created,
    StatusChanged,
    Deleted,
}

impl TicketEvent {
    /// Realtime channel name, scoped by resource type.
    pub fn channel(&self) -> &'static str {
        match self {
            TicketEvent::Created => "chamado:created",
            TicketEvent::StatusChanged => "chamado:status",
            TicketEvent::Deleted => "chamado:deleted",
        }
    }

    pub fn acao(&self) -> &'static str {
        match self {
            TicketEvent::Created => "created",
            TicketEvent::StatusChanged => "status",
            TicketEvent::Deleted => "deleted",
        }
    }
}

/// Channel every persisted notification is also announced on.
pub const NOTIFICATION_CHANNEL: &str = "notification:new";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_channels() {
        assert_eq!(TicketEvent::Created.channel(), "chamado:created");
        assert_eq!(TicketEvent::StatusChanged.channel(), "chamado:status");
        assert_eq!(TicketEvent::Deleted.channel(), "chamado:deleted");
    }

    #[test]
    fn test_event_acao() {
        assert_eq!(TicketEvent::Created.acao(), "created");
        assert_eq!(TicketEvent::StatusChanged.acao(), "status");
        assert_eq!(TicketEvent::Deleted.acao(), "deleted");
    }
}
