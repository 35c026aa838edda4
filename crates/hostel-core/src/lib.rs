//! # Hostel Core
//! 
//! Domain entities, services, and repository traits for room allocation and
//! payment accounting.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
