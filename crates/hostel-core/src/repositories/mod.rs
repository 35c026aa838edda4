//! Repository traits (ports)

pub mod hostel_repository;
pub mod semester_repository;
pub mod room_repository;
pub mod student_repository;
pub mod allocation_repository;
pub mod payment_repository;
pub mod check_in_repository;
pub mod expense_repository;
pub mod message_history_repository;
pub mod audit_recorder;

use std::sync::Arc;

pub use hostel_repository::HostelRepository;
pub use semester_repository::SemesterRepository;
pub use room_repository::RoomRepository;
pub use student_repository::StudentRepository;
pub use allocation_repository::AllocationRepository;
pub use payment_repository::PaymentRepository;
pub use check_in_repository::CheckInRepository;
pub use expense_repository::ExpenseRepository;
pub use message_history_repository::MessageHistoryRepository;
pub use audit_recorder::AuditRecorder;

/// Every persistence port the domain services need.
#[derive(Clone)]
pub struct Repositories {
    pub hostels: Arc<dyn HostelRepository>,
    pub semesters: Arc<dyn SemesterRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub allocations: Arc<dyn AllocationRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub check_ins: Arc<dyn CheckInRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
}
