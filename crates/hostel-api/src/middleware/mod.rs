//! Request extractors for caller identity and request validation

pub mod auth;
pub mod validated;

pub use auth::{AuthUser, IdempotencyKey};
pub use validated::ValidatedJson;
