// Shared errors
pub mod auth_error;
pub mod config_error;

pub use auth_error::*;
pub use config_error::*;
