//! Domain layer for the helpdesk backend.
//!
//! This crate contains:
//! - Domain models (Ticket, Attachment, TicketMessage, Notification, User)
//! - Pure business logic: status normalization and transition effects,
//!   identifier sequences, history feed assembly
//! - Domain error types

pub mod models;
pub mod services;
