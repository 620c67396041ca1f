// External clients
pub mod email_sender;
pub mod smtp_email_sender;

pub use email_sender::*;
pub use smtp_email_sender::*;
