//! Persistence adapter for events.
//!
//! [`EventStore`] is the boundary the service talks to. [`PgEventStore`] backs
//! it with a shared Postgres pool; [`InMemoryEventStore`] keeps records in
//! process memory for tests and local runs. Every call takes the [`Deadline`]
//! it must finish by.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Event;
use crate::utils::deadline::Deadline;

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::AdapterError;
pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Stores one fully-populated event. A duplicate id is a
    /// [`AdapterError::ConstraintViolation`], never an overwrite.
    async fn insert(&self, event: &Event, deadline: Deadline) -> Result<(), AdapterError>;

    /// All events ordered by `start_time`, then `created_at`, then `id`.
    async fn list_all(&self, deadline: Deadline) -> Result<Vec<Event>, AdapterError>;

    async fn find_by_id(&self, id: Uuid, deadline: Deadline)
        -> Result<Option<Event>, AdapterError>;

    async fn ping(&self, deadline: Deadline) -> Result<(), AdapterError>;
}
