// Auth domain models
pub mod auth;
pub mod user;
pub mod jwt;
pub mod refresh_token;

pub use auth::*;
pub use user::*;
pub use jwt::*;
pub use refresh_token::*;

