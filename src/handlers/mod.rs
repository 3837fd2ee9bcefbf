use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::models::CreateEventRequest;
use crate::routes::AppState;
use crate::services::events::parse_event_id;
use crate::utils::deadline::Deadline;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check(
    State(state): State<AppState>,
    deadline: Deadline,
) -> Result<Response, AppError> {
    state.events.ping(deadline).await?;

    let payload = HealthPayload {
        status: "ok",
        service: "events-api",
    };

    Ok(success(payload))
}

/// `POST /events`
pub async fn create_event(
    State(state): State<AppState>,
    deadline: Deadline,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    // Every decoding problem, content type included, is the client's
    let Json(request) = payload.map_err(|rejection| {
        AppError::ValidationError(format!("invalid JSON payload: {}", rejection.body_text()))
    })?;

    let created_event = state.events.create_event(request, deadline).await?;
    Ok(created(created_event))
}

/// `GET /events`
pub async fn list_events(
    State(state): State<AppState>,
    deadline: Deadline,
) -> Result<Response, AppError> {
    let events = state.events.list_events(deadline).await?;
    Ok(success(events))
}

/// `GET /events/:id`
pub async fn get_event(
    State(state): State<AppState>,
    deadline: Deadline,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&event_id)?;
    let event = state.events.find_event(id, deadline).await?;
    Ok(success(event))
}
