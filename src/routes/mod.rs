use std::any::Any;

use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, RequestDeadlineLayer};
use crate::handlers::{create_event, get_event, health_check, list_events};
use crate::services::EventService;
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
}

impl AppState {
    pub fn new(events: EventService) -> Self {
        Self { events }
    }
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event))
        .with_state(state)
        // Outermost last
        .layer(RequestDeadlineLayer::new(config.request_timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(create_cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::InternalServerError(detail).into_response()
}
