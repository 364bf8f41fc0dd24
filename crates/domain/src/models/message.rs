//! Follow-up message ("ticket send") domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A follow-up communication sent from a ticket to third parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: Uuid,
    pub chamado_id: Uuid,
    pub assunto: String,
    pub mensagem: String,
    /// Comma-separated recipient list, as typed by the sender.
    pub destinatarios: String,
    pub enviado_por: Option<String>,
    pub enviado_em: DateTime<Utc>,
}

impl TicketMessage {
    /// Splits the stored recipient list into trimmed, non-empty addresses.
    pub fn destinatario_list(&self) -> Vec<String> {
        split_destinatarios(&self.destinatarios)
    }
}

/// Payload for sending a follow-up message.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendTicketInput {
    #[validate(length(min = 1, max = 200, message = "Assunto é obrigatório"))]
    pub assunto: String,

    #[validate(length(min = 1, message = "Mensagem é obrigatória"))]
    pub mensagem: String,

    /// Comma-separated e-mail addresses.
    #[validate(custom(function = "validate_destinatarios"))]
    pub destinatarios: String,

    pub enviado_por: Option<String>,
}

fn split_destinatarios(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_destinatarios(raw: &str) -> Result<(), ValidationError> {
    let list = split_destinatarios(raw);
    if list.is_empty() || !list.iter().all(|a| a.contains('@')) {
        let mut err = ValidationError::new("destinatarios");
        err.message = Some("Informe ao menos um destinatário válido".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinatario_list_splits_and_trims() {
        let msg = TicketMessage {
            id: Uuid::new_v4(),
            chamado_id: Uuid::new_v4(),
            assunto: "Orçamento".to_string(),
            mensagem: "Segue em anexo.".to_string(),
            destinatarios: " a@ex.com , b@ex.com ,, ".to_string(),
            enviado_por: None,
            enviado_em: Utc::now(),
        };
        assert_eq!(msg.destinatario_list(), vec!["a@ex.com", "b@ex.com"]);
    }

    #[test]
    fn test_validate_destinatarios() {
        assert!(validate_destinatarios("a@ex.com").is_ok());
        assert!(validate_destinatarios("a@ex.com, b@ex.com").is_ok());
        assert!(validate_destinatarios("").is_err());
        assert!(validate_destinatarios(" , ").is_err());
        assert!(validate_destinatarios("a@ex.com, sem-arroba").is_err());
    }

    #[test]
    fn test_send_ticket_input_validation() {
        let input = SendTicketInput {
            assunto: "Assunto".to_string(),
            mensagem: "Corpo".to_string(),
            destinatarios: "fornecedor@ex.com".to_string(),
            enviado_por: None,
        };
        assert!(input.validate().is_ok());

        let bad = SendTicketInput {
            assunto: String::new(),
            ..input
        };
        assert!(bad.validate().is_err());
    }
}
