//! # Hostel Core - Domain Module
//! 
//! Domain entities and pure business rules.

pub mod actor;
pub mod pricing;
pub mod hostel;
pub mod semester;
pub mod room;
pub mod student;
pub mod allocation;
pub mod payment;
pub mod check_in;
pub mod expense;
pub mod audit;
pub mod notification;
pub mod report;

// Re-export all entities and enums
pub use actor::{Actor, Capability, Role};
pub use pricing::{markup_ratio, max_money, price_per_student, display_price_per_student, round_money, Pricing};
pub use hostel::{Hostel, HostelFeature};
pub use semester::{NewSemester, Semester};
pub use room::Room;
pub use student::{NewStudent, Student};
pub use allocation::{admit_allocation, Allocation, NewAllocation, RoomOccupancy};
pub use payment::{validate_amount, BalanceSnapshot, DuplicateProbe, LedgerState, NewPayment, Payment, PaymentStatus};
pub use check_in::{CheckIn, NewCheckIn};
pub use expense::{Expense, NewExpense};
pub use audit::{AuditAction, AuditEntry};
pub use notification::{Channel, DeliveryError, DispatchReport, MessageStatus, MessageType, NewMessageHistory, NotificationRequest};
pub use report::{AllocationView, CategoryTotal, ExpenseSummary, FinanceStatistics, PaymentView, ReportScope};
