use async_trait::async_trait;
use sqlx::PgPool;

use hostel_core::domain::NewMessageHistory;
use hostel_core::error::DomainError;
use hostel_core::repositories::MessageHistoryRepository;
use hostel_shared::EntityId;

use super::db_error;

pub struct PgMessageHistoryRepository {
    pool: PgPool,
}

impl PgMessageHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageHistoryRepository for PgMessageHistoryRepository {
    async fn record(&self, entry: &NewMessageHistory) -> Result<EntityId, DomainError> {
        sqlx::query_scalar(
            r#"
            INSERT INTO message_history (student_id, channel, message_type, recipient, content, status, error)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(entry.student_id)
        .bind(entry.channel.as_str())
        .bind(entry.message_type.as_str())
        .bind(&entry.recipient)
        .bind(&entry.content)
        .bind(entry.status.as_str())
        .bind(&entry.error)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("recording message history"))
    }
}
