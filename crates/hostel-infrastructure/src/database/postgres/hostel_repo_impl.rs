use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use hostel_core::domain::{Hostel, HostelFeature};
use hostel_core::error::DomainError;
use hostel_core::repositories::HostelRepository;
use hostel_shared::EntityId;

use super::db_error;

pub struct PgHostelRepository {
    pool: PgPool,
}

impl PgHostelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct HostelRow {
    pub id: i32,
    pub name: String,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<HostelRow> for Hostel {
    fn from(row: HostelRow) -> Self {
        Hostel {
            id: row.id,
            name: row.name,
            location: row.location,
            contact_phone: row.contact_phone,
            contact_email: row.contact_email,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl HostelRepository for PgHostelRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Hostel>, DomainError> {
        let row: Option<HostelRow> = sqlx::query_as(
            r#"
            SELECT id, name, location, contact_phone, contact_email, is_active, created_at
            FROM hostels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding hostel by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn feature_enabled(&self, hostel_id: EntityId, feature: HostelFeature) -> Result<bool, DomainError> {
        let enabled: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT enabled
            FROM hostel_features
            WHERE hostel_id = $1 AND feature = $2
            "#,
        )
        .bind(hostel_id)
        .bind(feature.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("reading hostel feature"))?;

        Ok(enabled.unwrap_or(false))
    }
}
