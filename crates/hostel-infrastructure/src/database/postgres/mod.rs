//! PostgreSQL repository implementations

pub mod hostel_repo_impl;
pub mod semester_repo_impl;
pub mod room_repo_impl;
pub mod student_repo_impl;
pub mod allocation_repo_impl;
pub mod payment_repo_impl;
pub mod check_in_repo_impl;
pub mod expense_repo_impl;
pub mod message_history_repo_impl;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::error;

use hostel_core::error::DomainError;
use hostel_core::repositories::Repositories;

pub use allocation_repo_impl::PgAllocationRepository;
pub use check_in_repo_impl::PgCheckInRepository;
pub use expense_repo_impl::PgExpenseRepository;
pub use hostel_repo_impl::PgHostelRepository;
pub use message_history_repo_impl::PgMessageHistoryRepository;
pub use payment_repo_impl::PgPaymentRepository;
pub use room_repo_impl::PgRoomRepository;
pub use semester_repo_impl::PgSemesterRepository;
pub use student_repo_impl::PgStudentRepository;

/// Builds every repository adapter over one pool.
pub struct PgRepositories;

impl PgRepositories {
    pub fn build(pool: &PgPool) -> Repositories {
        Repositories {
            hostels: Arc::new(PgHostelRepository::new(pool.clone())),
            semesters: Arc::new(PgSemesterRepository::new(pool.clone())),
            rooms: Arc::new(PgRoomRepository::new(pool.clone())),
            students: Arc::new(PgStudentRepository::new(pool.clone())),
            allocations: Arc::new(PgAllocationRepository::new(pool.clone())),
            payments: Arc::new(PgPaymentRepository::new(pool.clone())),
            check_ins: Arc::new(PgCheckInRepository::new(pool.clone())),
            expenses: Arc::new(PgExpenseRepository::new(pool.clone())),
        }
    }
}

/// Logs and wraps a driver error.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

/// Name of the unique constraint `e` violated, if that is what happened.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string())
}
