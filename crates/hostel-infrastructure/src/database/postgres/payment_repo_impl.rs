// ============================================================================
// Hostel Infrastructure - PostgreSQL Payment Repository
// File: crates/hostel-infrastructure/src/database/postgres/payment_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use hostel_core::domain::{Allocation, DuplicateProbe, LedgerState, NewPayment, Payment, PaymentView, ReportScope};
use hostel_core::error::DomainError;
use hostel_core::repositories::PaymentRepository;
use hostel_shared::EntityId;

use super::{db_error, unique_violation};

pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    pub id: i32,
    pub allocation_id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub student_id: i32,
    pub amount: Decimal,
    pub recorded_by: i32,
    pub recorded_at: DateTime<Utc>,
    pub idempotency_key: Option<Uuid>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            allocation_id: row.allocation_id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            student_id: row.student_id,
            amount: row.amount,
            recorded_by: row.recorded_by,
            recorded_at: row.recorded_at,
            idempotency_key: row.idempotency_key,
        }
    }
}

#[derive(Debug, FromRow)]
struct PaymentViewRow {
    pub id: i32,
    pub allocation_id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub student_id: i32,
    pub student_name: Option<String>,
    pub room_name: Option<String>,
    pub amount: Decimal,
    pub recorded_by: i32,
    pub recorded_at: DateTime<Utc>,
}

impl From<PaymentViewRow> for PaymentView {
    fn from(row: PaymentViewRow) -> Self {
        PaymentView {
            id: row.id,
            allocation_id: row.allocation_id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            student_id: row.student_id,
            student_name: row.student_name,
            room_name: row.room_name,
            amount: row.amount,
            recorded_by: row.recorded_by,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LedgerRow {
    pub total_paid: Decimal,
    pub keyed_duplicate: Option<i32>,
    pub recent_duplicate: Option<i32>,
}

const PAYMENT_COLUMNS: &str =
    "id, allocation_id, hostel_id, semester_id, student_id, amount, recorded_by, recorded_at, idempotency_key";

async fn read_ledger(
    conn: &mut PgConnection,
    allocation: &Allocation,
    probe: &DuplicateProbe,
) -> Result<LedgerState, DomainError> {
    let row: LedgerRow = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(amount), 0) AS total_paid,
            (SELECT id FROM payments
              WHERE allocation_id = $1 AND idempotency_key = $2
              LIMIT 1) AS keyed_duplicate,
            (SELECT id FROM payments
              WHERE allocation_id = $1 AND amount = $3 AND recorded_by = $4 AND recorded_at >= $5
              ORDER BY recorded_at DESC, id DESC
              LIMIT 1) AS recent_duplicate
        FROM payments
        WHERE allocation_id = $1
        "#,
    )
    .bind(allocation.id)
    .bind(probe.idempotency_key)
    .bind(probe.amount)
    .bind(probe.recorded_by)
    .bind(probe.since)
    .fetch_one(conn)
    .await
    .map_err(db_error("reading payment ledger"))?;

    Ok(LedgerState {
        price: allocation.room_price_at_allocation,
        total_paid: row.total_paid,
        keyed_duplicate: row.keyed_duplicate,
        recent_duplicate: row.recent_duplicate,
    })
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn ledger_state(&self, allocation: &Allocation, probe: &DuplicateProbe) -> Result<LedgerState, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquiring connection"))?;
        read_ledger(&mut conn, allocation, probe).await
    }

    async fn append(
        &self,
        allocation: &Allocation,
        payment: &NewPayment,
        probe: &DuplicateProbe,
    ) -> Result<Payment, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting payment"))?;

        // Concurrent payments against one allocation queue up behind this lock
        sqlx::query("SELECT id FROM allocations WHERE id = $1 FOR UPDATE")
            .bind(allocation.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("locking allocation"))?
            .ok_or(DomainError::AllocationNotFound(allocation.id))?;

        let ledger = read_ledger(&mut tx, allocation, probe).await?;
        ledger.admit(payment.amount)?;

        let inserted: Result<PaymentRow, sqlx::Error> = sqlx::query_as(&format!(
            r#"
            INSERT INTO payments
                (allocation_id, hostel_id, semester_id, student_id, amount, recorded_by, idempotency_key, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(allocation.id)
        .bind(allocation.hostel_id)
        .bind(allocation.semester_id)
        .bind(allocation.student_id)
        .bind(payment.amount)
        .bind(payment.recorded_by)
        .bind(payment.idempotency_key)
        .bind(probe.submitted_at)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if unique_violation(&e).is_some() => {
                drop(tx);
                warn!("Idempotency key reused for allocation {}", allocation.id);
                let ledger = self.ledger_state(allocation, probe).await?;
                return Err(match ledger.keyed_duplicate {
                    Some(payment_id) => DomainError::DuplicatePayment { payment_id },
                    None => DomainError::Conflict("Payment was already recorded under this idempotency key".to_string()),
                });
            }
            Err(e) => return Err(db_error("inserting payment")(e)),
        };

        tx.commit().await.map_err(db_error("committing payment"))?;

        info!(
            "Payment {} recorded: {} against allocation {} (balance before {})",
            row.id,
            row.amount,
            row.allocation_id,
            ledger.balance()
        );
        Ok(row.into())
    }

    async fn total_paid(&self, allocation_id: EntityId) -> Result<Decimal, DomainError> {
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payments WHERE allocation_id = $1")
            .bind(allocation_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("summing payments"))
    }

    async fn list_for_allocation(&self, allocation_id: EntityId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE allocation_id = $1 ORDER BY recorded_at DESC, id DESC",
            PAYMENT_COLUMNS
        ))
        .bind(allocation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing payments for allocation"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<PaymentView>, DomainError> {
        // Left joins: the allocation may have been checked out since
        let rows: Vec<PaymentViewRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.allocation_id, p.hostel_id, p.semester_id, p.student_id,
                   s.full_name AS student_name, r.name AS room_name,
                   p.amount, p.recorded_by, p.recorded_at
            FROM payments p
            LEFT JOIN students s ON s.id = p.student_id
            LEFT JOIN allocations a ON a.id = p.allocation_id
            LEFT JOIN rooms r ON r.id = a.room_id
            WHERE p.semester_id = $1
              AND ($2::int IS NULL OR p.hostel_id = $2)
            ORDER BY p.recorded_at DESC, p.id DESC
            "#,
        )
        .bind(scope.semester_id)
        .bind(scope.hostel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing payments"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}
