//! Entity definitions (database row mappings).

pub mod attachment;
pub mod catalog;
pub mod message;
pub mod notification;
pub mod ticket;
pub mod user;

pub use attachment::{AttachmentContentEntity, AttachmentEntity};
pub use catalog::{ProblemCategoryEntity, UnitEntity};
pub use message::TicketMessageEntity;
pub use notification::NotificationEntity;
pub use ticket::{StatusHistoryEntity, TicketEntity};
pub use user::UserEntity;
