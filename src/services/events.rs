use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{CreateEventRequest, CreatedEvent, Event};
use crate::storage::{AdapterError, EventStore};
use crate::utils::deadline::Deadline;
use crate::utils::error::AppError;

/// Per-call storage budget used when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Fields of a create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewEvent {
    pub fn validate(request: CreateEventRequest) -> Result<Self, AppError> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }

        let start_time = parse_timestamp("start_time", &request.start_time)?;
        let end_time = parse_timestamp("end_time", &request.end_time)?;

        if start_time >= end_time {
            return Err(AppError::ValidationError(
                "start_time must be before end_time".to_string(),
            ));
        }

        Ok(Self {
            title: request.title,
            description: request.description,
            start_time,
            end_time,
        })
    }

    /// Stamps the event with a fresh id and the current time.
    fn into_event(self) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: Utc::now(),
        }
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| AppError::ValidationError(format!("{field} must be RFC3339 timestamp")))
}

/// Parses a path identifier; anything that isn't a UUID is a client error.
pub fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::ValidationError("invalid event id".to_string()))
}

/// Validates requests and drives the event store.
///
/// Holds no state besides the shared store handle; every call is independent.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    query_timeout: Duration,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    fn query_deadline(&self, deadline: Deadline) -> Deadline {
        deadline.tighten(self.query_timeout)
    }

    pub async fn create_event(
        &self,
        request: CreateEventRequest,
        deadline: Deadline,
    ) -> Result<CreatedEvent, AppError> {
        let mut event = NewEvent::validate(request)?.into_event();

        match self.store.insert(&event, self.query_deadline(deadline)).await {
            Ok(()) => {}
            Err(AdapterError::ConstraintViolation(detail)) => {
                // Ids are generated here, so a conflict means a collision; retry once
                warn!(event_id = %event.id, detail = %detail, "Event id collision, retrying insert");
                event.id = Uuid::new_v4();
                self.store
                    .insert(&event, self.query_deadline(deadline))
                    .await
                    .map_err(|e| AppError::storage("could not insert event", e))?;
            }
            Err(e) => return Err(AppError::storage("could not insert event", e)),
        }

        info!(event_id = %event.id, start_time = %event.start_time, "Event created");
        Ok(CreatedEvent { id: event.id })
    }

    pub async fn list_events(&self, deadline: Deadline) -> Result<Vec<Event>, AppError> {
        self.store
            .list_all(self.query_deadline(deadline))
            .await
            .map_err(|e| AppError::storage("could not query events", e))
    }

    pub async fn find_event(&self, id: Uuid, deadline: Deadline) -> Result<Event, AppError> {
        self.store
            .find_by_id(id, self.query_deadline(deadline))
            .await
            .map_err(|e| AppError::storage("could not load event", e))?
            .ok_or_else(|| AppError::NotFound(format!("event '{id}' was not found")))
    }

    pub async fn ping(&self, deadline: Deadline) -> Result<(), AppError> {
        self.store
            .ping(self.query_deadline(deadline))
            .await
            .map_err(|e| AppError::storage("storage unavailable", e))
    }
}
