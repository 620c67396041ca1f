// Request extractors
pub mod auth;
pub mod validation;

pub use auth::*;
pub use validation::*;
