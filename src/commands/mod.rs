//! HTTP entry points.
//!
//! Handlers only validate payloads, enqueue intents, or read views. All state
//! changes happen inside the batch scheduler.

pub mod events;
pub mod items;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Config(_) | Self::Io(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("request failed: {self}");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        (status, MessageBody::new(message)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let items = Router::new()
        .route("/available", get(items::get_available))
        .route("/selected", get(items::get_selected))
        .route("/queue", post(items::queue_item))
        .route("/select", post(items::select_item))
        .route("/deselect", post(items::deselect_item))
        .route("/move", post(items::move_item))
        .route("/events", get(events::stream_events));

    Router::new()
        .route("/", get(health_check))
        .nest("/api/items", items)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
