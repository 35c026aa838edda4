use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use hostel_core::domain::Room;
use hostel_core::error::DomainError;
use hostel_core::repositories::RoomRepository;
use hostel_shared::EntityId;

use super::db_error;

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoomRow {
    pub id: i32,
    pub hostel_id: i32,
    pub name: String,
    pub price: Decimal,
    pub capacity: i32,
    pub is_active: bool,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            hostel_id: row.hostel_id,
            name: row.name,
            price: row.price,
            capacity: row.capacity,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Room>, DomainError> {
        let row: Option<RoomRow> = sqlx::query_as(
            r#"
            SELECT id, hostel_id, name, price, capacity, is_active
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding room by id"))?;

        Ok(row.map(|r| r.into()))
    }
}
