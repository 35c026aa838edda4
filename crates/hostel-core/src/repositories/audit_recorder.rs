//! Audit recorder trait (port)

use crate::domain::AuditEntry;

/// Append-only sink for [`AuditEntry`] values. Recording never blocks the
/// caller and never fails it; adapters log their own delivery problems.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
pub trait AuditRecorder: Send + Sync {
    fn record(&self, entry: AuditEntry);
}
