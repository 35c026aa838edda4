//! Request and response bodies (camelCase JSON)

pub mod allocation;
pub mod check_in;
pub mod expense;
pub mod payment;
pub mod query;
pub mod semester;
pub mod student;

pub use allocation::{AllocateRequest, AllocateResponse, AllocationDto};
pub use check_in::{CheckInDto, CheckInRequest};
pub use expense::{ExpenseDto, RecordExpenseRequest};
pub use payment::{PaymentDto, PaymentSummaryResponse, RecordPaymentRequest, RecordPaymentResponse};
pub use query::{HostelQuery, ScopeQuery};
pub use semester::{CreateSemesterRequest, SemesterDto};
pub use student::{RegisterStudentRequest, StudentDto};
