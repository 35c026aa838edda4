//! In-memory adapters for tests
//!
//! One mutex-guarded store backs every repository port and applies the same
//! admission rules as the PostgreSQL adapters. Enabled for downstream crates
//! through the `test-support` feature.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use hostel_shared::constants::{DEFAULT_CURRENCY_SUFFIX, DEFAULT_DUPLICATE_PAYMENT_WINDOW_SECS};
use hostel_shared::EntityId;

use crate::domain::{
    admit_allocation, Actor, Allocation, AllocationView, AuditAction, AuditEntry, CategoryTotal, CheckIn,
    DeliveryError, DuplicateProbe, Expense, ExpenseSummary, Hostel, HostelFeature, LedgerState, NewAllocation,
    NewCheckIn, NewExpense, NewMessageHistory, NewPayment, NewSemester, NewStudent, Payment, PaymentStatus,
    PaymentView, ReportScope, Role, Room, RoomOccupancy, Semester, Student,
};
use crate::error::DomainError;
use crate::repositories::{
    AllocationRepository, AuditRecorder, CheckInRepository, ExpenseRepository, HostelRepository,
    MessageHistoryRepository, PaymentRepository, Repositories, RoomRepository, SemesterRepository,
    StudentRepository,
};
use crate::services::notification::{EmailSender, MessageTemplates, NotificationDispatcher, SmsSender};
use crate::services::{AllocateCommand, AllocationOutcome, Services};

#[derive(Default)]
struct State {
    last_id: EntityId,
    hostels: Vec<Hostel>,
    features: HashSet<(EntityId, HostelFeature)>,
    semesters: Vec<Semester>,
    rooms: Vec<Room>,
    students: Vec<Student>,
    allocations: Vec<Allocation>,
    payments: Vec<Payment>,
    check_ins: Vec<CheckIn>,
    expenses: Vec<Expense>,
    messages: Vec<NewMessageHistory>,
}

impl State {
    fn next_id(&mut self) -> EntityId {
        self.last_id += 1;
        self.last_id
    }

    fn allocation_for(&self, student_id: EntityId, semester_id: EntityId) -> Option<&Allocation> {
        self.allocations
            .iter()
            .find(|a| a.student_id == student_id && a.semester_id == semester_id)
    }

    /// Allocations of the room whose student has not checked out.
    fn occupied(&self, room_id: EntityId, semester_id: EntityId) -> i64 {
        self.allocations
            .iter()
            .filter(|a| a.room_id == room_id && a.semester_id == semester_id)
            .filter(|a| {
                !self.check_ins.iter().any(|c| {
                    c.student_id == a.student_id && c.semester_id == semester_id && c.checked_out_at.is_some()
                })
            })
            .count() as i64
    }

    fn total_paid(&self, allocation_id: EntityId) -> Decimal {
        self.payments
            .iter()
            .filter(|p| p.allocation_id == allocation_id)
            .map(|p| p.amount)
            .sum()
    }

    fn ledger(&self, allocation: &Allocation, probe: &DuplicateProbe) -> LedgerState {
        let mine: Vec<&Payment> = self
            .payments
            .iter()
            .filter(|p| p.allocation_id == allocation.id)
            .collect();
        LedgerState {
            price: allocation.room_price_at_allocation,
            total_paid: mine.iter().map(|p| p.amount).sum(),
            keyed_duplicate: mine.iter().find(|p| probe.matches_key(p)).map(|p| p.id),
            recent_duplicate: mine
                .iter()
                .filter(|p| probe.matches_recent(p))
                .max_by_key(|p| p.recorded_at)
                .map(|p| p.id),
        }
    }
}

fn in_scope(scope: &ReportScope, hostel_id: EntityId, semester_id: EntityId) -> bool {
    semester_id == scope.semester_id && scope.hostel_id.map_or(true, |h| h == hostel_id)
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            hostels: self.clone(),
            semesters: self.clone(),
            rooms: self.clone(),
            students: self.clone(),
            allocations: self.clone(),
            payments: self.clone(),
            check_ins: self.clone(),
            expenses: self.clone(),
        }
    }

    pub fn seed_hostel(&self, name: &str) -> Hostel {
        let mut state = self.lock();
        let hostel = Hostel {
            id: state.next_id(),
            name: name.to_string(),
            location: None,
            contact_phone: None,
            contact_email: None,
            is_active: true,
            created_at: Utc::now(),
        };
        state.hostels.push(hostel.clone());
        hostel
    }

    pub fn enable_feature(&self, hostel_id: EntityId, feature: HostelFeature) {
        self.lock().features.insert((hostel_id, feature));
    }

    pub fn seed_semester(&self, hostel_id: EntityId, name: &str, active: bool) -> Semester {
        let mut state = self.lock();
        if active {
            for s in state.semesters.iter_mut().filter(|s| s.hostel_id == hostel_id) {
                s.is_active = false;
            }
        }
        let today = Utc::now().date_naive();
        let semester = Semester {
            id: state.next_id(),
            hostel_id,
            name: name.to_string(),
            start_date: today,
            end_date: today + chrono::Duration::days(120),
            is_active: active,
            created_at: Utc::now(),
        };
        state.semesters.push(semester.clone());
        semester
    }

    pub fn seed_room(&self, hostel_id: EntityId, name: &str, price: Decimal, capacity: i32) -> Room {
        let mut state = self.lock();
        let room = Room {
            id: state.next_id(),
            hostel_id,
            name: name.to_string(),
            price,
            capacity,
            is_active: true,
        };
        state.rooms.push(room.clone());
        room
    }

    pub fn deactivate_room(&self, room_id: EntityId) {
        if let Some(room) = self.lock().rooms.iter_mut().find(|r| r.id == room_id) {
            room.is_active = false;
        }
    }

    /// Seeds a student with an email address and a phone number.
    pub fn seed_student(
        &self,
        hostel_id: EntityId,
        semester_id: Option<EntityId>,
        full_name: &str,
        registration_number: &str,
    ) -> Student {
        let mut state = self.lock();
        let student = Student {
            id: state.next_id(),
            hostel_id,
            semester_id,
            full_name: full_name.to_string(),
            registration_number: registration_number.to_string(),
            phone: Some("+255700000001".to_string()),
            email: Some(format!("{}@students.test", registration_number.to_lowercase())),
            gender: None,
            created_at: Utc::now(),
        };
        state.students.push(student.clone());
        student
    }

    /// Inserts a payment as-is, bypassing the ledger rules. Useful for
    /// back-dating.
    pub fn seed_payment(
        &self,
        allocation: &Allocation,
        amount: Decimal,
        recorded_by: EntityId,
        recorded_at: DateTime<Utc>,
    ) -> Payment {
        let mut state = self.lock();
        let payment = Payment {
            id: state.next_id(),
            allocation_id: allocation.id,
            hostel_id: allocation.hostel_id,
            semester_id: allocation.semester_id,
            student_id: allocation.student_id,
            amount,
            recorded_by,
            recorded_at,
            idempotency_key: None,
        };
        state.payments.push(payment.clone());
        payment
    }

    pub fn allocations(&self) -> Vec<Allocation> {
        self.lock().allocations.clone()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    pub fn messages(&self) -> Vec<NewMessageHistory> {
        self.lock().messages.clone()
    }
}

#[async_trait]
impl HostelRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Hostel>, DomainError> {
        Ok(self.lock().hostels.iter().find(|h| h.id == id).cloned())
    }

    async fn feature_enabled(&self, hostel_id: EntityId, feature: HostelFeature) -> Result<bool, DomainError> {
        Ok(self.lock().features.contains(&(hostel_id, feature)))
    }
}

#[async_trait]
impl SemesterRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Semester>, DomainError> {
        Ok(self.lock().semesters.iter().find(|s| s.id == id).cloned())
    }

    async fn find_active(&self, hostel_id: EntityId) -> Result<Option<Semester>, DomainError> {
        Ok(self
            .lock()
            .semesters
            .iter()
            .find(|s| s.hostel_id == hostel_id && s.is_active)
            .cloned())
    }

    async fn list(&self, hostel_id: Option<EntityId>) -> Result<Vec<Semester>, DomainError> {
        Ok(self
            .lock()
            .semesters
            .iter()
            .filter(|s| hostel_id.map_or(true, |h| h == s.hostel_id))
            .cloned()
            .collect())
    }

    async fn create(&self, semester: &NewSemester) -> Result<Semester, DomainError> {
        let mut state = self.lock();
        let created = Semester {
            id: state.next_id(),
            hostel_id: semester.hostel_id,
            name: semester.name.clone(),
            start_date: semester.start_date,
            end_date: semester.end_date,
            is_active: false,
            created_at: Utc::now(),
        };
        state.semesters.push(created.clone());
        Ok(created)
    }

    async fn activate(&self, id: EntityId) -> Result<Semester, DomainError> {
        let mut state = self.lock();
        let hostel_id = state
            .semesters
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.hostel_id)
            .ok_or(DomainError::SemesterNotFound(id))?;
        let mut activated = None;
        for s in state.semesters.iter_mut().filter(|s| s.hostel_id == hostel_id) {
            s.is_active = s.id == id;
            if s.is_active {
                activated = Some(s.clone());
            }
        }
        activated.ok_or(DomainError::SemesterNotFound(id))
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Room>, DomainError> {
        Ok(self.lock().rooms.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl StudentRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Student>, DomainError> {
        Ok(self.lock().students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_registration(
        &self,
        registration_number: &str,
        semester_id: EntityId,
    ) -> Result<Option<Student>, DomainError> {
        Ok(self
            .lock()
            .students
            .iter()
            .find(|s| s.registration_number == registration_number && s.semester_id == Some(semester_id))
            .cloned())
    }

    async fn create(&self, student: &NewStudent) -> Result<Student, DomainError> {
        let mut state = self.lock();
        if state
            .students
            .iter()
            .any(|s| s.registration_number == student.registration_number && s.semester_id == Some(student.semester_id))
        {
            return Err(DomainError::StudentAlreadyRegistered {
                registration_number: student.registration_number.clone(),
            });
        }
        let created = Student {
            id: state.next_id(),
            hostel_id: student.hostel_id,
            semester_id: Some(student.semester_id),
            full_name: student.full_name.clone(),
            registration_number: student.registration_number.clone(),
            phone: student.phone.clone(),
            email: student.email.clone(),
            gender: student.gender.clone(),
            created_at: Utc::now(),
        };
        state.students.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl AllocationRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Allocation>, DomainError> {
        Ok(self.lock().allocations.iter().find(|a| a.id == id).cloned())
    }

    async fn find_for_student(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<Option<Allocation>, DomainError> {
        Ok(self.lock().allocation_for(student_id, semester_id).cloned())
    }

    async fn count_occupied(&self, room_id: EntityId, semester_id: EntityId) -> Result<i64, DomainError> {
        Ok(self.lock().occupied(room_id, semester_id))
    }

    async fn insert(&self, allocation: &NewAllocation, capacity: i32) -> Result<Allocation, DomainError> {
        let mut state = self.lock();
        let occupancy = RoomOccupancy {
            capacity,
            occupied: state.occupied(allocation.room_id, allocation.semester_id),
        };
        admit_allocation(
            state.allocation_for(allocation.student_id, allocation.semester_id),
            allocation.room_id,
            occupancy,
        )?;
        let created = Allocation {
            id: state.next_id(),
            hostel_id: allocation.hostel_id,
            semester_id: allocation.semester_id,
            student_id: allocation.student_id,
            room_id: allocation.room_id,
            room_price_at_allocation: allocation.pricing.actual,
            display_price_at_allocation: allocation.pricing.display,
            allocated_by: Some(allocation.allocated_by),
            allocated_at: Utc::now(),
        };
        state.allocations.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: EntityId) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.allocations.len();
        state.allocations.retain(|a| a.id != id);
        Ok(state.allocations.len() < before)
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<AllocationView>, DomainError> {
        let state = self.lock();
        let mut rows = Vec::new();
        for a in state
            .allocations
            .iter()
            .filter(|a| in_scope(scope, a.hostel_id, a.semester_id))
        {
            let student = state.students.iter().find(|s| s.id == a.student_id);
            let room = state.rooms.iter().find(|r| r.id == a.room_id);
            let total_paid = state.total_paid(a.id);
            rows.push(AllocationView {
                id: a.id,
                hostel_id: a.hostel_id,
                semester_id: a.semester_id,
                student_id: a.student_id,
                student_name: student.map(|s| s.full_name.clone()).unwrap_or_default(),
                registration_number: student.map(|s| s.registration_number.clone()).unwrap_or_default(),
                room_id: a.room_id,
                room_name: room.map(|r| r.name.clone()).unwrap_or_default(),
                price_per_student: a.room_price_at_allocation,
                display_price: a.display_price_at_allocation,
                total_paid,
                balance: a.room_price_at_allocation - total_paid,
                status: PaymentStatus::from_totals(a.room_price_at_allocation, total_paid),
                allocated_at: a.allocated_at,
            });
        }
        Ok(rows)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn ledger_state(&self, allocation: &Allocation, probe: &DuplicateProbe) -> Result<LedgerState, DomainError> {
        Ok(self.lock().ledger(allocation, probe))
    }

    async fn append(
        &self,
        allocation: &Allocation,
        payment: &NewPayment,
        probe: &DuplicateProbe,
    ) -> Result<Payment, DomainError> {
        let mut state = self.lock();
        if !state.allocations.iter().any(|a| a.id == allocation.id) {
            return Err(DomainError::AllocationNotFound(allocation.id));
        }
        state.ledger(allocation, probe).admit(payment.amount)?;
        let created = Payment {
            id: state.next_id(),
            allocation_id: allocation.id,
            hostel_id: allocation.hostel_id,
            semester_id: allocation.semester_id,
            student_id: allocation.student_id,
            amount: payment.amount,
            recorded_by: payment.recorded_by,
            recorded_at: probe.submitted_at,
            idempotency_key: payment.idempotency_key,
        };
        state.payments.push(created.clone());
        Ok(created)
    }

    async fn total_paid(&self, allocation_id: EntityId) -> Result<Decimal, DomainError> {
        Ok(self.lock().total_paid(allocation_id))
    }

    async fn list_for_allocation(&self, allocation_id: EntityId) -> Result<Vec<Payment>, DomainError> {
        Ok(self
            .lock()
            .payments
            .iter()
            .filter(|p| p.allocation_id == allocation_id)
            .cloned()
            .collect())
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<PaymentView>, DomainError> {
        let state = self.lock();
        let mut rows: Vec<PaymentView> = state
            .payments
            .iter()
            .filter(|p| in_scope(scope, p.hostel_id, p.semester_id))
            .map(|p| {
                let room_name = state
                    .allocations
                    .iter()
                    .find(|a| a.id == p.allocation_id)
                    .and_then(|a| state.rooms.iter().find(|r| r.id == a.room_id))
                    .map(|r| r.name.clone());
                PaymentView {
                    id: p.id,
                    allocation_id: p.allocation_id,
                    hostel_id: p.hostel_id,
                    semester_id: p.semester_id,
                    student_id: p.student_id,
                    student_name: state
                        .students
                        .iter()
                        .find(|s| s.id == p.student_id)
                        .map(|s| s.full_name.clone()),
                    room_name,
                    amount: p.amount,
                    recorded_by: p.recorded_by,
                    recorded_at: p.recorded_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl CheckInRepository for InMemoryStore {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<CheckIn>, DomainError> {
        Ok(self.lock().check_ins.iter().find(|c| c.id == id).cloned())
    }

    async fn find_open(&self, student_id: EntityId, semester_id: EntityId) -> Result<Option<CheckIn>, DomainError> {
        Ok(self
            .lock()
            .check_ins
            .iter()
            .find(|c| c.student_id == student_id && c.semester_id == semester_id && c.is_open())
            .cloned())
    }

    async fn create(&self, check_in: &NewCheckIn) -> Result<CheckIn, DomainError> {
        let mut state = self.lock();
        if let Some(open) = state
            .check_ins
            .iter()
            .find(|c| c.student_id == check_in.student_id && c.semester_id == check_in.semester_id && c.is_open())
        {
            return Err(DomainError::AlreadyCheckedIn { check_in_id: open.id });
        }
        let created = CheckIn {
            id: state.next_id(),
            student_id: check_in.student_id,
            hostel_id: check_in.hostel_id,
            semester_id: check_in.semester_id,
            checked_in_at: Utc::now(),
            checked_in_by: check_in.checked_in_by,
            checked_out_at: None,
            checked_out_by: None,
        };
        state.check_ins.push(created.clone());
        Ok(created)
    }

    async fn close(&self, id: EntityId, closed_by: EntityId, at: DateTime<Utc>) -> Result<CheckIn, DomainError> {
        let mut state = self.lock();
        let check_in = state
            .check_ins
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::CheckInNotFound(id))?;
        if !check_in.is_open() {
            return Err(DomainError::AlreadyCheckedOut(id));
        }
        check_in.checked_out_at = Some(at);
        check_in.checked_out_by = Some(closed_by);
        Ok(check_in.clone())
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn create(&self, expense: &NewExpense) -> Result<Expense, DomainError> {
        let mut state = self.lock();
        let created = Expense {
            id: state.next_id(),
            hostel_id: expense.hostel_id,
            semester_id: expense.semester_id,
            amount: expense.amount,
            description: expense.description.clone(),
            category: expense.category.clone(),
            recorded_by: expense.recorded_by,
            expense_date: expense.expense_date,
            created_at: Utc::now(),
        };
        state.expenses.push(created.clone());
        Ok(created)
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<Expense>, DomainError> {
        Ok(self
            .lock()
            .expenses
            .iter()
            .filter(|e| in_scope(scope, e.hostel_id, e.semester_id))
            .cloned()
            .collect())
    }

    async fn summary(&self, scope: &ReportScope) -> Result<ExpenseSummary, DomainError> {
        let state = self.lock();
        let mut by_category: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for e in state
            .expenses
            .iter()
            .filter(|e| in_scope(scope, e.hostel_id, e.semester_id))
        {
            let entry = by_category.entry(e.category.clone()).or_insert((Decimal::ZERO, 0));
            entry.0 += e.amount;
            entry.1 += 1;
        }
        Ok(ExpenseSummary {
            semester_id: Some(scope.semester_id),
            total: by_category.values().map(|(total, _)| *total).sum(),
            count: by_category.values().map(|(_, count)| *count).sum(),
            by_category: by_category
                .into_iter()
                .map(|(category, (total, count))| CategoryTotal { category, total, count })
                .collect(),
        })
    }
}

#[async_trait]
impl MessageHistoryRepository for InMemoryStore {
    async fn record(&self, entry: &NewMessageHistory) -> Result<EntityId, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        state.messages.push(entry.clone());
        Ok(id)
    }
}

/// Keeps every entry it is handed.
#[derive(Default)]
pub struct RecordingAuditRecorder {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingAuditRecorder {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.entries().into_iter().map(|e| e.action).collect()
    }
}

impl AuditRecorder for RecordingAuditRecorder {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}

/// Email and SMS stand-in. Successful sends are kept as
/// `(recipient, subject, body)`; SMS has an empty subject.
#[derive(Default)]
pub struct RecordingSender {
    fail: bool,
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Transport("channel unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.deliver(to, subject, body)
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send(&self, phone: &str, body: &str) -> Result<(), DeliveryError> {
        self.deliver(phone, "", body)
    }
}

/// Services wired over the in-memory store.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub audit: Arc<RecordingAuditRecorder>,
    pub email: Arc<RecordingSender>,
    pub sms: Arc<RecordingSender>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_senders(RecordingSender::default(), RecordingSender::default())
    }

    /// Both channels refuse every message.
    pub fn with_failing_channels() -> Self {
        Self::with_senders(RecordingSender::failing(), RecordingSender::failing())
    }

    fn with_senders(email: RecordingSender, sms: RecordingSender) -> Self {
        let store = InMemoryStore::new();
        let audit = Arc::new(RecordingAuditRecorder::default());
        let email = Arc::new(email);
        let sms = Arc::new(sms);
        let templates = MessageTemplates::new(DEFAULT_CURRENCY_SUFFIX).expect("built-in templates compile");
        let notifier = Arc::new(NotificationDispatcher::new(
            Some(email.clone() as Arc<dyn EmailSender>),
            Some(sms.clone() as Arc<dyn SmsSender>),
            store.clone(),
            templates,
        ));
        let services = Services::new(
            store.repositories(),
            audit.clone(),
            notifier,
            chrono::Duration::seconds(DEFAULT_DUPLICATE_PAYMENT_WINDOW_SECS as i64),
        );
        Self {
            store,
            audit,
            email,
            sms,
            services,
        }
    }

    pub fn custodian(&self, hostel_id: EntityId) -> Actor {
        Actor::new(10, Role::Custodian, Some(hostel_id))
    }

    pub fn hostel_with_active_semester(&self, name: &str) -> (Hostel, Semester) {
        let hostel = self.store.seed_hostel(name);
        let semester = self.store.seed_semester(hostel.id, "Semester I", true);
        (hostel, semester)
    }

    pub async fn allocate(
        &self,
        actor: &Actor,
        student_id: EntityId,
        room_id: EntityId,
    ) -> Result<AllocationOutcome, DomainError> {
        self.services
            .allocations
            .allocate(
                actor,
                AllocateCommand {
                    student_id,
                    room_id,
                    hostel_id: None,
                    display_price: None,
                },
            )
            .await
    }

    /// A fresh hostel with one student allocated to a room of the given
    /// price and capacity.
    pub async fn allocated(&self, room_price: Decimal, capacity: i32) -> (Actor, Allocation) {
        let (hostel, semester) = self.hostel_with_active_semester("Fixture");
        let room = self.store.seed_room(hostel.id, "F1", room_price, capacity);
        let student = self.store.seed_student(hostel.id, Some(semester.id), "Fixture Student", "FX-1");
        let actor = self.custodian(hostel.id);
        let outcome = self
            .allocate(&actor, student.id, room.id)
            .await
            .expect("fixture allocation succeeds");
        (actor, outcome.allocation)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
