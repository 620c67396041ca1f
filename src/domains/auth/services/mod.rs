// Auth domain services
pub mod auth_service;
pub mod cleanup_scheduler;
pub mod jwt_service;
pub mod one_time_token;
pub mod password_service;
pub mod refresh_token_ledger;
pub mod state;

pub use auth_service::*;
pub use cleanup_scheduler::*;
pub use jwt_service::*;
pub use one_time_token::*;
pub use password_service::*;
pub use refresh_token_ledger::*;
pub use state::*;
