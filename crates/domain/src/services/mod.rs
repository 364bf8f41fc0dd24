//! Domain services for the helpdesk backend.
//!
//! Services contain pure business logic that operates on domain models; no
//! I/O happens here.

pub mod history;
pub mod identifier;
pub mod status;

pub use history::{
    assemble_feed, within_correlation_window, HistoryEvent, HistoryEventKind,
    CORRELATION_WINDOW_SECS,
};
pub use identifier::{next_codigo, next_protocolo, protocolo_prefix, MAX_IDENTIFIER_ATTEMPTS};
pub use status::{normalize, transition_stamps, TransitionStamps};
