use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored event record, also the projection returned by list/find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /events`.
///
/// Timestamps stay raw strings here so the service can report which one failed
/// to parse. Unknown keys, including `id` and `created_at`, are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEvent {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_rejects_unknown_fields() {
        let body = json!({
            "title": "Standup",
            "start_time": "2026-03-01T09:00:00Z",
            "end_time": "2026-03-01T09:15:00Z",
            "id": "3f1c2f4e-8a5b-4a52-9d0e-6c1c0b7e2a11",
        });

        let err = serde_json::from_value::<CreateEventRequest>(body).unwrap_err();
        assert!(err.to_string().contains("unknown field `id`"));
    }

    #[test]
    fn test_request_keeps_empty_description_distinct_from_absent() {
        let absent: CreateEventRequest = serde_json::from_value(json!({
            "title": "Standup",
            "start_time": "2026-03-01T09:00:00Z",
            "end_time": "2026-03-01T09:15:00Z",
        }))
        .unwrap();
        assert_eq!(absent.description, None);

        let empty: CreateEventRequest = serde_json::from_value(json!({
            "title": "Standup",
            "description": "",
            "start_time": "2026-03-01T09:00:00Z",
            "end_time": "2026-03-01T09:15:00Z",
        }))
        .unwrap();
        assert_eq!(empty.description.as_deref(), Some(""));
    }

    #[test]
    fn test_event_projection_omits_absent_description() {
        let event = Event {
            id: Uuid::new_v4(),
            title: "Standup".to_string(),
            description: None,
            start_time: "2026-03-01T09:00:00Z".parse().unwrap(),
            end_time: "2026-03-01T09:15:00Z".parse().unwrap(),
            created_at: "2026-02-01T12:00:00Z".parse().unwrap(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["start_time"], "2026-03-01T09:00:00Z");
        assert_eq!(value["created_at"], "2026-02-01T12:00:00Z");
    }
}
