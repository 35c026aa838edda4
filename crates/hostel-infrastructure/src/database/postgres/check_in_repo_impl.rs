use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use hostel_core::domain::{CheckIn, NewCheckIn};
use hostel_core::error::DomainError;
use hostel_core::repositories::CheckInRepository;
use hostel_shared::EntityId;

use super::{db_error, unique_violation};

pub struct PgCheckInRepository {
    pool: PgPool,
}

impl PgCheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CheckInRow {
    pub id: i32,
    pub student_id: i32,
    pub hostel_id: i32,
    pub semester_id: i32,
    pub checked_in_at: DateTime<Utc>,
    pub checked_in_by: i32,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub checked_out_by: Option<i32>,
}

impl From<CheckInRow> for CheckIn {
    fn from(row: CheckInRow) -> Self {
        CheckIn {
            id: row.id,
            student_id: row.student_id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            checked_in_at: row.checked_in_at,
            checked_in_by: row.checked_in_by,
            checked_out_at: row.checked_out_at,
            checked_out_by: row.checked_out_by,
        }
    }
}

#[async_trait]
impl CheckInRepository for PgCheckInRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<CheckIn>, DomainError> {
        let row: Option<CheckInRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, hostel_id, semester_id, checked_in_at, checked_in_by,
                   checked_out_at, checked_out_by
            FROM check_ins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding check-in by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_open(&self, student_id: EntityId, semester_id: EntityId) -> Result<Option<CheckIn>, DomainError> {
        let row: Option<CheckInRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, hostel_id, semester_id, checked_in_at, checked_in_by,
                   checked_out_at, checked_out_by
            FROM check_ins
            WHERE student_id = $1 AND semester_id = $2 AND checked_out_at IS NULL
            "#,
        )
        .bind(student_id)
        .bind(semester_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding open check-in"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, check_in: &NewCheckIn) -> Result<CheckIn, DomainError> {
        let row: CheckInRow = sqlx::query_as(
            r#"
            INSERT INTO check_ins (student_id, hostel_id, semester_id, checked_in_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, hostel_id, semester_id, checked_in_at, checked_in_by,
                      checked_out_at, checked_out_by
            "#,
        )
        .bind(check_in.student_id)
        .bind(check_in.hostel_id)
        .bind(check_in.semester_id)
        .bind(check_in.checked_in_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                return DomainError::Conflict("Student already has an open check-in".to_string());
            }
            db_error("creating check-in")(e)
        })?;

        Ok(row.into())
    }

    async fn close(&self, id: EntityId, closed_by: EntityId, at: DateTime<Utc>) -> Result<CheckIn, DomainError> {
        let row: Option<CheckInRow> = sqlx::query_as(
            r#"
            UPDATE check_ins
            SET checked_out_at = $2, checked_out_by = $3
            WHERE id = $1 AND checked_out_at IS NULL
            RETURNING id, student_id, hostel_id, semester_id, checked_in_at, checked_in_by,
                      checked_out_at, checked_out_by
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(closed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("closing check-in"))?;

        match row {
            Some(row) => Ok(row.into()),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(DomainError::AlreadyCheckedOut(id)),
                None => Err(DomainError::CheckInNotFound(id)),
            },
        }
    }
}
