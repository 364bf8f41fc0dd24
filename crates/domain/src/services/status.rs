//! Status normalization and transition effects.

use crate::models::TicketStatus;
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Maps loose status input to a canonical label.
///
/// The input is uppercased and trimmed, then looked up in a fixed synonym
/// table. Unmatched input is title-cased and accepted only if it already is
/// one of the five canonical forms; anything else silently falls back to
/// `Aberto`. Invalid strings are never rejected at this layer — the result
/// is always canonical, which is what callers persist.
pub fn normalize(input: &str) -> TicketStatus {
    let upper = input.trim().to_uppercase();
    if let Some(status) = synonym(&upper) {
        return status;
    }
    TicketStatus::from_str(&title_case(input.trim())).unwrap_or(TicketStatus::Aberto)
}

fn synonym(upper: &str) -> Option<TicketStatus> {
    match upper {
        "ABERTO" | "NOVO" => Some(TicketStatus::Aberto),
        "EM ANDAMENTO" | "ANDAMENTO" | "AGUARDANDO" => Some(TicketStatus::EmAndamento),
        "EM ANALISE" | "EM ANÁLISE" | "ANALISE" | "ANÁLISE" => Some(TicketStatus::EmAnalise),
        "CONCLUIDO" | "CONCLUÍDO" | "FECHADO" | "FINALIZADO" | "RESOLVIDO" => {
            Some(TicketStatus::Concluido)
        }
        "CANCELADO" | "CANCELADA" => Some(TicketStatus::Cancelado),
        _ => None,
    }
}

fn title_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Timestamps a transition writes onto the ticket row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionStamps {
    /// Set on the first transition away from `Aberto`, then never again.
    pub data_primeira_resposta: Option<DateTime<Utc>>,
    /// Set on every entry into `Concluído`; the latest conclusion wins.
    pub data_conclusao: Option<DateTime<Utc>>,
}

/// Computes the side-effect timestamps of a status transition.
///
/// `primeira_resposta` is the value currently stored on the ticket.
pub fn transition_stamps(
    anterior: TicketStatus,
    novo: TicketStatus,
    primeira_resposta: Option<DateTime<Utc>>,
    agora: DateTime<Utc>,
) -> TransitionStamps {
    let mut stamps = TransitionStamps::default();
    if anterior == TicketStatus::Aberto && novo != TicketStatus::Aberto && primeira_resposta.is_none()
    {
        stamps.data_primeira_resposta = Some(agora);
    }
    if novo == TicketStatus::Concluido {
        stamps.data_conclusao = Some(agora);
    }
    stamps
}
