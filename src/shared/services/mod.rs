// Shared services
pub mod app_state;
pub mod notification_service;

pub use app_state::*;
pub use notification_service::*;
