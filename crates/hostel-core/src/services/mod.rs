//! Domain services
//!
//! Each service owns one area of the ledger and talks to storage only
//! through the repository ports.

pub mod notification;
pub mod allocation_service;
pub mod payment_service;
pub mod semester_service;
pub mod student_service;
pub mod check_in_service;
pub mod expense_service;
pub mod reporting_service;
mod support;

use std::sync::Arc;

pub use allocation_service::{AllocateCommand, AllocationOutcome, AllocationService};
pub use check_in_service::CheckInService;
pub use expense_service::{ExpenseService, RecordExpenseCommand};
pub use notification::{EmailSender, NotificationDispatcher, SmsSender};
pub use payment_service::{DisplayAmounts, PaymentOutcome, PaymentService, PaymentSummary, RecordPaymentCommand};
pub use reporting_service::ReportingService;
pub use semester_service::{CreateSemesterCommand, SemesterService};
pub use student_service::{RegisterStudentCommand, StudentService};

use crate::repositories::{AuditRecorder, Repositories};

/// Every service, wired over one set of adapters.
#[derive(Clone)]
pub struct Services {
    pub allocations: Arc<AllocationService>,
    pub payments: Arc<PaymentService>,
    pub semesters: Arc<SemesterService>,
    pub students: Arc<StudentService>,
    pub check_ins: Arc<CheckInService>,
    pub expenses: Arc<ExpenseService>,
    pub reporting: Arc<ReportingService>,
}

impl Services {
    pub fn new(
        repos: Repositories,
        audit: Arc<dyn AuditRecorder>,
        notifier: Arc<NotificationDispatcher>,
        duplicate_window: chrono::Duration,
    ) -> Self {
        Self {
            allocations: Arc::new(AllocationService::new(repos.clone(), audit.clone(), notifier.clone())),
            payments: Arc::new(PaymentService::new(repos.clone(), audit.clone(), notifier, duplicate_window)),
            semesters: Arc::new(SemesterService::new(repos.clone(), audit.clone())),
            students: Arc::new(StudentService::new(repos.clone(), audit.clone())),
            check_ins: Arc::new(CheckInService::new(repos.clone(), audit.clone())),
            expenses: Arc::new(ExpenseService::new(repos.clone(), audit)),
            reporting: Arc::new(ReportingService::new(repos)),
        }
    }
}
