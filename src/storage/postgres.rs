use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AdapterError, EventStore};
use crate::models::Event;
use crate::utils::deadline::Deadline;

/// Postgres-backed event store.
///
/// Holds a clone of the process-wide pool; each call checks a connection out
/// of the pool for the duration of one statement.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: &Event, deadline: Deadline) -> Result<(), AdapterError> {
        let query = sqlx::query(
            r#"
            INSERT INTO events (id, title, description, start_time, end_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.created_at)
        .execute(&self.pool);

        deadline.run(query).await??;
        Ok(())
    }

    async fn list_all(&self, deadline: Deadline) -> Result<Vec<Event>, AdapterError> {
        let query = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_time, end_time, created_at
            FROM events
            ORDER BY start_time ASC, created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool);

        Ok(deadline.run(query).await??)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        deadline: Deadline,
    ) -> Result<Option<Event>, AdapterError> {
        let query = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_time, end_time, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool);

        Ok(deadline.run(query).await??)
    }

    async fn ping(&self, deadline: Deadline) -> Result<(), AdapterError> {
        let query = sqlx::query("SELECT 1").execute(&self.pool);

        deadline.run(query).await??;
        Ok(())
    }
}
