use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{AdapterError, EventStore};
use crate::models::Event;
use crate::utils::deadline::Deadline;

/// Process-local event store with the same ordering and conflict rules as the
/// Postgres adapter. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryEventStore {
    // Insertion order; listing sorts a copy.
    events: RwLock<Vec<Event>>,
    latency: Option<Duration>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before touching the data, so callers can
    /// observe deadline handling without a real database.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            events: RwLock::default(),
            latency: Some(latency),
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: &Event, deadline: Deadline) -> Result<(), AdapterError> {
        deadline
            .run(async {
                self.simulate_latency().await;

                let mut events = self.events.write();
                if events.iter().any(|existing| existing.id == event.id) {
                    return Err(AdapterError::ConstraintViolation(format!(
                        "duplicate event id {}",
                        event.id
                    )));
                }
                events.push(event.clone());
                Ok(())
            })
            .await?
    }

    async fn list_all(&self, deadline: Deadline) -> Result<Vec<Event>, AdapterError> {
        deadline
            .run(async {
                self.simulate_latency().await;

                let mut events = self.events.read().clone();
                events.sort_by(|a, b| {
                    (a.start_time, a.created_at, a.id).cmp(&(b.start_time, b.created_at, b.id))
                });
                events
            })
            .await
            .map_err(AdapterError::from)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        deadline: Deadline,
    ) -> Result<Option<Event>, AdapterError> {
        deadline
            .run(async {
                self.simulate_latency().await;

                self.events
                    .read()
                    .iter()
                    .find(|event| event.id == id)
                    .cloned()
            })
            .await
            .map_err(AdapterError::from)
    }

    async fn ping(&self, deadline: Deadline) -> Result<(), AdapterError> {
        deadline.run(self.simulate_latency()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn event_starting_at(start: &str) -> Event {
        let start_time: DateTime<Utc> = start.parse().unwrap();
        Event {
            id: Uuid::new_v4(),
            title: format!("event at {start}"),
            description: None,
            start_time,
            end_time: start_time + chrono::Duration::hours(1),
            created_at: Utc::now(),
        }
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_list_orders_by_start_time() {
        let store = InMemoryEventStore::new();
        let late = event_starting_at("2026-03-03T09:00:00Z");
        let early = event_starting_at("2026-03-01T09:00:00Z");
        let middle = event_starting_at("2026-03-02T09:00:00Z");

        for event in [&late, &early, &middle] {
            store.insert(event, deadline()).await.unwrap();
        }

        let listed = store.list_all(deadline()).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![early.id, middle.id, late.id]);
    }

    #[tokio::test]
    async fn test_equal_start_and_created_at_order_by_id() {
        let store = InMemoryEventStore::new();
        let created_at = Utc::now();
        let mut high = event_starting_at("2026-03-01T09:00:00Z");
        let mut low = event_starting_at("2026-03-01T09:00:00Z");
        high.id = Uuid::from_u128(u128::MAX);
        low.id = Uuid::from_u128(0);
        high.created_at = created_at;
        low.created_at = created_at;

        // Larger id goes in first
        store.insert(&high, deadline()).await.unwrap();
        store.insert(&low, deadline()).await.unwrap();

        let listed = store.list_all(deadline()).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![low.id, high.id]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_constraint_violation() {
        let store = InMemoryEventStore::new();
        let event = event_starting_at("2026-03-01T09:00:00Z");
        store.insert(&event, deadline()).await.unwrap();

        let mut clash = event_starting_at("2026-04-01T09:00:00Z");
        clash.id = event.id;
        let err = store.insert(&clash, deadline()).await.unwrap_err();

        assert!(matches!(err, AdapterError::ConstraintViolation(_)));
        // Original record is untouched
        let stored = store.find_by_id(event.id, deadline()).await.unwrap();
        assert_eq!(stored, Some(event));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_id_is_none() {
        let store = InMemoryEventStore::new();
        let found = store.find_by_id(Uuid::new_v4(), deadline()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out_at_deadline() {
        let store = InMemoryEventStore::with_latency(Duration::from_secs(60));
        let event = event_starting_at("2026-03-01T09:00:00Z");

        let err = store.insert(&event, deadline()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Timeout));
        assert!(store.is_empty());

        let err = store.list_all(deadline()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Timeout));

        let err = store.ping(deadline()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Timeout));
    }
}
