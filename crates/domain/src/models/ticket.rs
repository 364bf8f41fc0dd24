//! Ticket (chamado) domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Canonical lifecycle states of a ticket.
///
/// Initial state is `Aberto`; `Concluido` and `Cancelado` are terminal in the
/// sense that nothing follows them by design, though no transition out of
/// them is blocked by the update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Aberto,
    EmAndamento,
    EmAnalise,
    Concluido,
    Cancelado,
}

impl TicketStatus {
    /// The five canonical labels, in display form.
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Aberto,
        TicketStatus::EmAndamento,
        TicketStatus::EmAnalise,
        TicketStatus::Concluido,
        TicketStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Aberto => "Aberto",
            TicketStatus::EmAndamento => "Em andamento",
            TicketStatus::EmAnalise => "Em análise",
            TicketStatus::Concluido => "Concluído",
            TicketStatus::Cancelado => "Cancelado",
        }
    }

    /// Whether this state ends the ticket lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Concluido | TicketStatus::Cancelado)
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    /// Strict parse: only the exact canonical labels are accepted. Loose
    /// input goes through [`crate::services::status::normalize`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Aberto" => Ok(TicketStatus::Aberto),
            "Em andamento" => Ok(TicketStatus::EmAndamento),
            "Em análise" => Ok(TicketStatus::EmAnalise),
            "Concluído" => Ok(TicketStatus::Concluido),
            "Cancelado" => Ok(TicketStatus::Cancelado),
            _ => Err(format!("Status desconhecido: {}", s)),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TicketStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TicketStatus::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A support ticket as seen by the rest of the system.
///
/// `codigo` and `protocolo` are each globally unique, assigned at creation
/// and never changed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
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
    pub status: TicketStatus,
    pub prioridade: String,
    pub data_abertura: DateTime<Utc>,
    pub data_primeira_resposta: Option<DateTime<Utc>>,
    pub data_conclusao: Option<DateTime<Utc>>,
    pub usuario_id: Option<Uuid>,
}

/// One recorded status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub status_anterior: String,
    pub status_novo: String,
    pub alterado_por: Option<String>,
    pub alterado_em: DateTime<Utc>,
}

/// Payload for opening a ticket.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicketInput {
    #[validate(length(min = 1, max = 100, message = "Solicitante é obrigatório"))]
    pub solicitante: String,

    #[validate(length(min = 1, max = 100, message = "Cargo é obrigatório"))]
    pub cargo: String,

    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_telefone"))]
    pub telefone: String,

    #[validate(length(min = 1, max = 100, message = "Unidade é obrigatória"))]
    pub unidade: String,

    #[validate(length(min = 1, max = 100, message = "Problema é obrigatório"))]
    pub problema: String,

    #[validate(length(max = 50))]
    pub internet_item: Option<String>,

    /// Optional scheduled-visit date as an ISO `YYYY-MM-DD` string.
    pub visita: Option<String>,

    pub descricao: Option<String>,
}

impl CreateTicketInput {
    /// Parses the optional visit date; `Err` carries a client-facing message.
    pub fn parse_visita(&self) -> Result<Option<NaiveDate>, String> {
        match self.visita.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::from_str(raw)
                .map(Some)
                .map_err(|_| "Data de visita inválida".to_string()),
        }
    }
}

/// Payload for a status update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusInput {
    #[validate(length(min = 1, message = "Status é obrigatório"))]
    pub status: String,
    pub alterado_por: Option<String>,
}

/// Credentials required before a ticket delete proceeds.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteTicketInput {
    #[validate(length(min = 1, message = "Usuário é obrigatório"))]
    pub usuario: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub senha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_labels() {
        assert_eq!(TicketStatus::Aberto.as_str(), "Aberto");
        assert_eq!(TicketStatus::EmAndamento.as_str(), "Em andamento");
        assert_eq!(TicketStatus::EmAnalise.as_str(), "Em análise");
        assert_eq!(TicketStatus::Concluido.as_str(), "Concluído");
        assert_eq!(TicketStatus::Cancelado.as_str(), "Cancelado");
    }

    #[test]
    fn test_status_from_str_strict() {
        for status in TicketStatus::ALL {
            assert_eq!(TicketStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(TicketStatus::from_str("aberto").is_err());
        assert!(TicketStatus::from_str("CONCLUIDO").is_err());
    }

    #[test]
    fn test_status_terminal_states() {
        assert!(TicketStatus::Concluido.is_terminal());
        assert!(TicketStatus::Cancelado.is_terminal());
        assert!(!TicketStatus::Aberto.is_terminal());
        assert!(!TicketStatus::EmAndamento.is_terminal());
        assert!(!TicketStatus::EmAnalise.is_terminal());
    }

    #[test]
    fn test_status_serde_uses_display_labels() {
        let json = serde_json::to_string(&TicketStatus::Concluido).unwrap();
        assert_eq!(json, "\"Concluído\"");
        let back: TicketStatus = serde_json::from_str("\"Em andamento\"").unwrap();
        assert_eq!(back, TicketStatus::EmAndamento);
        assert!(serde_json::from_str::<TicketStatus>("\"aguardando\"").is_err());
    }

    #[test]
    fn test_parse_visita() {
        let mut input = sample_input();
        assert_eq!(input.parse_visita().unwrap(), None);

        input.visita = Some("2026-03-15".to_string());
        assert_eq!(
            input.parse_visita().unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())
        );

        input.visita = Some(" ".to_string());
        assert_eq!(input.parse_visita().unwrap(), None);

        input.visita = Some("15/03/2026".to_string());
        assert!(input.parse_visita().is_err());
    }

    #[test]
    fn test_create_ticket_input_validation() {
        let input = sample_input();
        assert!(input.validate().is_ok());

        let mut bad = sample_input();
        bad.email = "nao-e-email".to_string();
        assert!(bad.validate().is_err());

        let mut bad = sample_input();
        bad.telefone = "abc".to_string();
        assert!(bad.validate().is_err());

        let mut bad = sample_input();
        bad.solicitante = String::new();
        assert!(bad.validate().is_err());
    }

    fn sample_input() -> CreateTicketInput {
        CreateTicketInput {
            solicitante: "Maria Souza".to_string(),
            cargo: "Recepção".to_string(),
            email: "maria@example.com".to_string(),
            telefone: "(11) 98765-4321".to_string(),
            unidade: "Unidade Centro".to_string(),
            problema: "Internet".to_string(),
            internet_item: Some("Wi-Fi".to_string()),
            visita: None,
            descricao: Some("Sem acesso na recepção".to_string()),
        }
    }
}
