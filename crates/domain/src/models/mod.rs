//! Domain models for the helpdesk backend.

pub mod attachment;
pub mod catalog;
pub mod message;
pub mod notification;
pub mod ticket;
pub mod user;

pub use attachment::{Attachment, AttachmentMeta, AttachmentUpload};
pub use catalog::{CreateProblemInput, CreateUnitInput, ProblemCategory, Unit};
pub use message::{SendTicketInput, TicketMessage};
pub use notification::{
    CreateNotificationInput, Notification, TicketEvent, NOTIFICATION_CHANNEL,
};
pub use ticket::{
    CreateTicketInput, DeleteTicketInput, StatusHistoryEntry, Ticket, TicketStatus,
    UpdateStatusInput,
};
pub use user::{CreateUserInput, LoginInput, NivelAcesso, User};
