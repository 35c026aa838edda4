//! Audit trail persistence with an async queue

mod logger;

pub use logger::{AuditLogger, AuditWorkers};
