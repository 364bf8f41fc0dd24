pub mod email;
pub mod notifier;
pub mod realtime;

pub use email::{EmailAttachment, EmailMessage, EmailService};
pub use notifier::NotificationFanout;
pub use realtime::{Envelope, RealtimeHub};
