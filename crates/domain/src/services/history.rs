//! History feed assembly.
//!
//! Merges heterogeneous ticket events (opening, description, status
//! transitions, follow-up messages) into one chronologically-sorted feed.

use crate::models::AttachmentMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Window used to correlate legacy attachments, which carry no message
/// foreign key, to the follow-up message closest in time: ±3 minutes.
pub const CORRELATION_WINDOW_SECS: i64 = 180;

/// Kind of a history feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryEventKind {
    Abertura,
    Descricao,
    Status,
    Ticket,
}

/// One entry of the assembled feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub t: DateTime<Utc>,
    pub tipo: HistoryEventKind,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub anexos: Vec<AttachmentMeta>,
}

/// Sorts events non-decreasing by timestamp. The sort is stable, so events
/// sharing a timestamp keep the order they were gathered in.
pub fn assemble_feed(mut events: Vec<HistoryEvent>) -> Vec<HistoryEvent> {
    events.sort_by_key(|e| e.t);
    events
}

/// Whether an attachment uploaded at `anexo_em` belongs to a message sent at
/// `mensagem_em` under the legacy time-proximity heuristic (±3 minutes,
/// inclusive).
pub fn within_correlation_window(mensagem_em: DateTime<Utc>, anexo_em: DateTime<Utc>) -> bool {
    (anexo_em - mensagem_em).num_seconds().abs() <= CORRELATION_WINDOW_SECS
}
