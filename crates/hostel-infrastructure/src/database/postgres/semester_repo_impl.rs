// ============================================================================
// Hostel Infrastructure - PostgreSQL Semester Repository
// File: crates/hostel-infrastructure/src/database/postgres/semester_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use hostel_core::domain::{NewSemester, Semester};
use hostel_core::error::DomainError;
use hostel_core::repositories::SemesterRepository;
use hostel_shared::EntityId;

use super::{db_error, unique_violation};

pub struct PgSemesterRepository {
    pool: PgPool,
}

impl PgSemesterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SemesterRow {
    pub id: i32,
    pub hostel_id: i32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SemesterRow> for Semester {
    fn from(row: SemesterRow) -> Self {
        Semester {
            id: row.id,
            hostel_id: row.hostel_id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SemesterRepository for PgSemesterRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Semester>, DomainError> {
        let row: Option<SemesterRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, name, start_date, end_date, is_active, created_at
            FROM semesters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding semester by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_active(&self, hostel_id: EntityId) -> Result<Option<Semester>, DomainError> {
        let row: Option<SemesterRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, name, start_date, end_date, is_active, created_at
            FROM semesters
            WHERE hostel_id = $1 AND is_active
            "#,
        )
        .bind(hostel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding active semester"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, hostel_id: Option<EntityId>) -> Result<Vec<Semester>, DomainError> {
        let rows: Vec<SemesterRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, name, start_date, end_date, is_active, created_at
            FROM semesters
            WHERE ($1::int IS NULL OR hostel_id = $1)
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(hostel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing semesters"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, semester: &NewSemester) -> Result<Semester, DomainError> {
        let row: SemesterRow = sqlx::query_as(
            r#"
            INSERT INTO semesters (hostel_id, name, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, hostel_id, name, start_date, end_date, is_active, created_at
            "#,
        )
        .bind(semester.hostel_id)
        .bind(&semester.name)
        .bind(semester.start_date)
        .bind(semester.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating semester"))?;

        Ok(row.into())
    }

    async fn activate(&self, id: EntityId) -> Result<Semester, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting semester activation"))?;

        let hostel_id: Option<i32> = sqlx::query_scalar("SELECT hostel_id FROM semesters WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("locking semester"))?;
        let hostel_id = hostel_id.ok_or(DomainError::SemesterNotFound(id))?;

        sqlx::query("UPDATE semesters SET is_active = FALSE WHERE hostel_id = $1 AND id <> $2 AND is_active")
            .bind(hostel_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deactivating semesters"))?;

        let row: SemesterRow = sqlx::query_as(
            r#"
            UPDATE semesters SET is_active = TRUE
            WHERE id = $1
            RETURNING id, hostel_id, name, start_date, end_date, is_active, created_at
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                error!("Concurrent activation for hostel {}: {}", hostel_id, e);
                DomainError::Conflict("Another semester was activated concurrently".to_string())
            } else {
                db_error("activating semester")(e)
            }
        })?;

        tx.commit().await.map_err(db_error("committing semester activation"))?;
        info!("Semester {} is now the active semester of hostel {}", id, hostel_id);
        Ok(row.into())
    }
}
