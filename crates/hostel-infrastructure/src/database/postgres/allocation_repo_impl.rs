// ============================================================================
// Hostel Infrastructure - PostgreSQL Allocation Repository
// File: crates/hostel-infrastructure/src/database/postgres/allocation_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, warn};

use hostel_core::domain::{
    admit_allocation, Allocation, AllocationView, NewAllocation, PaymentStatus, ReportScope, RoomOccupancy,
};
use hostel_core::error::DomainError;
use hostel_core::repositories::AllocationRepository;
use hostel_shared::EntityId;

use super::{db_error, unique_violation};

pub struct PgAllocationRepository {
    pool: PgPool,
}

impl PgAllocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AllocationRow {
    pub id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub student_id: i32,
    pub room_id: i32,
    pub room_price_at_allocation: Decimal,
    pub display_price_at_allocation: Option<Decimal>,
    pub allocated_by: Option<i32>,
    pub allocated_at: DateTime<Utc>,
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        Allocation {
            id: row.id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            student_id: row.student_id,
            room_id: row.room_id,
            room_price_at_allocation: row.room_price_at_allocation,
            display_price_at_allocation: row.display_price_at_allocation,
            allocated_by: row.allocated_by,
            allocated_at: row.allocated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AllocationViewRow {
    pub id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub registration_number: String,
    pub room_id: i32,
    pub room_name: String,
    pub room_price_at_allocation: Decimal,
    pub display_price_at_allocation: Option<Decimal>,
    pub total_paid: Decimal,
    pub allocated_at: DateTime<Utc>,
}

impl From<AllocationViewRow> for AllocationView {
    fn from(row: AllocationViewRow) -> Self {
        let price = row.room_price_at_allocation;
        AllocationView {
            id: row.id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            student_id: row.student_id,
            student_name: row.student_name,
            registration_number: row.registration_number,
            room_id: row.room_id,
            room_name: row.room_name,
            price_per_student: price,
            display_price: row.display_price_at_allocation,
            total_paid: row.total_paid,
            balance: price - row.total_paid,
            status: PaymentStatus::from_totals(price, row.total_paid),
            allocated_at: row.allocated_at,
        }
    }
}

const ALLOCATION_COLUMNS: &str = "id, hostel_id, semester_id, student_id, room_id, \
     room_price_at_allocation, display_price_at_allocation, allocated_by, allocated_at";

async fn find_for_student_on(
    conn: &mut PgConnection,
    student_id: EntityId,
    semester_id: EntityId,
) -> Result<Option<Allocation>, DomainError> {
    let row: Option<AllocationRow> = sqlx::query_as(&format!(
        "SELECT {} FROM allocations WHERE student_id = $1 AND semester_id = $2",
        ALLOCATION_COLUMNS
    ))
    .bind(student_id)
    .bind(semester_id)
    .fetch_optional(conn)
    .await
    .map_err(db_error("finding allocation for student"))?;

    Ok(row.map(|r| r.into()))
}

async fn count_occupied_on(
    conn: &mut PgConnection,
    room_id: EntityId,
    semester_id: EntityId,
) -> Result<i64, DomainError> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM allocations a
        WHERE a.room_id = $1
          AND a.semester_id = $2
          AND NOT EXISTS (
              SELECT 1 FROM check_ins c
              WHERE c.student_id = a.student_id
                AND c.semester_id = a.semester_id
                AND c.checked_out_at IS NOT NULL
          )
        "#,
    )
    .bind(room_id)
    .bind(semester_id)
    .fetch_one(conn)
    .await
    .map_err(db_error("counting room occupancy"))
}

/// Error for a request that lost the `(student_id, semester_id)` race. Same
/// body as a sequential repeat would get.
fn lost_race(winner: Option<&Allocation>, room_id: EntityId) -> DomainError {
    admit_allocation(winner, room_id, RoomOccupancy { capacity: 1, occupied: 0 })
        .err()
        .unwrap_or_else(|| DomainError::Conflict("Student was allocated by a concurrent request".to_string()))
}

#[async_trait]
impl AllocationRepository for PgAllocationRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Allocation>, DomainError> {
        let row: Option<AllocationRow> =
            sqlx::query_as(&format!("SELECT {} FROM allocations WHERE id = $1", ALLOCATION_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding allocation by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_for_student(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<Option<Allocation>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquiring connection"))?;
        find_for_student_on(&mut conn, student_id, semester_id).await
    }

    async fn count_occupied(&self, room_id: EntityId, semester_id: EntityId) -> Result<i64, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquiring connection"))?;
        count_occupied_on(&mut conn, room_id, semester_id).await
    }

    async fn insert(&self, allocation: &NewAllocation, capacity: i32) -> Result<Allocation, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting allocation"))?;

        // Serialises allocations into the same room
        sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(allocation.room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("locking room"))?
            .ok_or(DomainError::RoomNotFound(allocation.room_id))?;

        let existing = find_for_student_on(&mut tx, allocation.student_id, allocation.semester_id).await?;
        let occupied = count_occupied_on(&mut tx, allocation.room_id, allocation.semester_id).await?;
        admit_allocation(existing.as_ref(), allocation.room_id, RoomOccupancy { capacity, occupied })?;

        let inserted: Result<AllocationRow, sqlx::Error> = sqlx::query_as(&format!(
            r#"
            INSERT INTO allocations
                (hostel_id, semester_id, student_id, room_id,
                 room_price_at_allocation, display_price_at_allocation, allocated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ALLOCATION_COLUMNS
        ))
        .bind(allocation.hostel_id)
        .bind(allocation.semester_id)
        .bind(allocation.student_id)
        .bind(allocation.room_id)
        .bind(allocation.pricing.actual)
        .bind(allocation.pricing.display)
        .bind(allocation.allocated_by)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if unique_violation(&e).is_some() => {
                drop(tx);
                warn!(
                    "Concurrent allocation for student {} in semester {}",
                    allocation.student_id, allocation.semester_id
                );
                let winner = self
                    .find_for_student(allocation.student_id, allocation.semester_id)
                    .await?;
                return Err(lost_race(winner.as_ref(), allocation.room_id));
            }
            Err(e) => return Err(db_error("inserting allocation")(e)),
        };

        tx.commit().await.map_err(db_error("committing allocation"))?;

        info!(
            "Allocation {} created: student {} -> room {} ({}/{} before insert)",
            row.id, row.student_id, row.room_id, occupied, capacity
        );
        Ok(row.into())
    }

    async fn delete(&self, id: EntityId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM allocations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting allocation"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, scope: &ReportScope) -> Result<Vec<AllocationView>, DomainError> {
        let rows: Vec<AllocationViewRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.hostel_id, a.semester_id, a.student_id,
                   s.full_name AS student_name, s.registration_number,
                   a.room_id, r.name AS room_name,
                   a.room_price_at_allocation, a.display_price_at_allocation,
                   COALESCE((SELECT SUM(p.amount) FROM payments p WHERE p.allocation_id = a.id), 0) AS total_paid,
                   a.allocated_at
            FROM allocations a
            JOIN students s ON s.id = a.student_id
            JOIN rooms r ON r.id = a.room_id
            WHERE a.semester_id = $1
              AND ($2::int IS NULL OR a.hostel_id = $2)
            ORDER BY a.allocated_at DESC, a.id DESC
            "#,
        )
        .bind(scope.semester_id)
        .bind(scope.hostel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing allocations"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn winner(room_id: EntityId) -> Allocation {
        Allocation {
            id: 41,
            hostel_id: 1,
            semester_id: 2,
            student_id: 3,
            room_id,
            room_price_at_allocation: dec!(300000),
            display_price_at_allocation: None,
            allocated_by: Some(9),
            allocated_at: Utc::now(),
        }
    }

    #[test]
    fn race_loser_for_same_room_gets_idempotent_conflict() {
        let err = lost_race(Some(&winner(5)), 5);
        assert!(matches!(err, DomainError::AlreadyAllocated { allocation_id: 41 }));
        assert_eq!(err.existing_id(), Some(41));
    }

    #[test]
    fn race_loser_for_other_room_is_told_to_check_out() {
        let err = lost_race(Some(&winner(5)), 6);
        assert!(matches!(err, DomainError::AllocatedToAnotherRoom { allocation_id: 41, room_id: 5 }));
    }

    #[test]
    fn vanished_winner_is_still_a_conflict() {
        assert!(matches!(lost_race(None, 5), DomainError::Conflict(_)));
    }
}
