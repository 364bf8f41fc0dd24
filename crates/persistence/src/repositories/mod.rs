//! Repository implementations.

pub mod attachment;
pub mod catalog;
pub mod legacy;
pub mod message;
pub mod notification;
pub mod ticket;
pub mod user;

pub use attachment::AttachmentRepository;
pub use catalog::CatalogRepository;
pub use legacy::LegacyAttachmentAdapter;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use ticket::{CreateTicketError, NewTicket, TicketRepository};
pub use user::UserRepository;
