use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;

use hostel_core::domain::{NewStudent, Student};
use hostel_core::error::DomainError;
use hostel_core::repositories::StudentRepository;
use hostel_shared::EntityId;

use super::{db_error, unique_violation};

pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StudentRow {
    pub id: i32,
    pub hostel_id: i32,
    pub semester_id: Option<i32>,
    pub full_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            hostel_id: row.hostel_id,
            semester_id: row.semester_id,
            full_name: row.full_name,
            registration_number: row.registration_number,
            phone: row.phone,
            email: row.email,
            gender: row.gender,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Student>, DomainError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, semester_id, full_name, registration_number,
                   phone, email, gender, created_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding student by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_registration(
        &self,
        registration_number: &str,
        semester_id: EntityId,
    ) -> Result<Option<Student>, DomainError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, semester_id, full_name, registration_number,
                   phone, email, gender, created_at
            FROM students
            WHERE registration_number = $1 AND semester_id = $2
            "#,
        )
        .bind(registration_number)
        .bind(semester_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding student by registration number"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, student: &NewStudent) -> Result<Student, DomainError> {
        let row: StudentRow = sqlx::query_as(
            r#"
            INSERT INTO students (hostel_id, semester_id, full_name, registration_number, phone, email, gender)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, hostel_id, semester_id, full_name, registration_number,
                      phone, email, gender, created_at
            "#,
        )
        .bind(student.hostel_id)
        .bind(student.semester_id)
        .bind(&student.full_name)
        .bind(&student.registration_number)
        .bind(&student.phone)
        .bind(&student.email)
        .bind(&student.gender)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                warn!("Registration number {} already used in semester {}", student.registration_number, student.semester_id);
                return DomainError::StudentAlreadyRegistered {
                    registration_number: student.registration_number.clone(),
                };
            }
            db_error("creating student")(e)
        })?;

        Ok(row.into())
    }
}
