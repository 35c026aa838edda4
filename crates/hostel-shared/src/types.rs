//! Common types

/// Primary key type shared by every persisted entity (`SERIAL` columns).
pub type EntityId = i32;
