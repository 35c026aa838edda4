//! # Hostel Security
//! 
//! Bearer token issuance and validation for staff callers.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
