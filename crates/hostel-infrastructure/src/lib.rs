//! # Hostel Infrastructure
//! 
//! PostgreSQL adapters, the batched audit logger, and delivery channels.

pub mod database;
pub mod audit;
pub mod notification;

pub use audit::{AuditLogger, AuditWorkers};
pub use database::{create_pool, run_migrations, PgMessageHistoryRepository, PgRepositories};
pub use notification::{HttpSmsSender, SmtpEmailSender};
