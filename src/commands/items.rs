use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::MessageBody;
use crate::core::{ItemId, ModifyTask, Page, PageRequest};
use crate::{AppError, AppState};

/// Raw paging parameters. Values stay strings so that malformed numbers fall
/// back to defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub filter: Option<String>,
}

impl PageQuery {
    fn to_request(&self) -> PageRequest {
        PageRequest::from_raw(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.filter.as_deref(),
        )
    }
}

pub async fn get_available(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>, AppError> {
    let service = state.query.clone();
    let request = query.to_request();
    read_view(move || service.available(&request)).await
}

pub async fn get_selected(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>, AppError> {
    let service = state.query.clone();
    let request = query.to_request();
    read_view(move || service.selected(&request)).await
}

/// Store walks run on the blocking pool, off the async workers.
async fn read_view(view: impl FnOnce() -> Page + Send + 'static) -> Result<Json<Page>, AppError> {
    tokio::task::spawn_blocking(view)
        .await
        .map(Json)
        .map_err(|e| AppError::Other(format!("read view failed: {e}")))
}

pub async fn queue_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let id = required_id(&body, "id")?;
    state.queue.enqueue_add(id)?;
    tracing::debug!(id, "queued item for addition");
    Ok(accepted("Item queued for addition"))
}

pub async fn select_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let id = required_id(&body, "id")?;
    state.queue.enqueue_modify(ModifyTask::Select(id));
    Ok(accepted("Select action queued"))
}

pub async fn deselect_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let id = required_id(&body, "id")?;
    state.queue.enqueue_modify(ModifyTask::Deselect(id));
    Ok(accepted("Deselect action queued"))
}

pub async fn move_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let dragged_id = required_id(&body, "draggedItemId")?;
    // Anything other than a valid id behaves like "no target": append.
    let target_id = body.get("targetItemId").and_then(as_item_id);
    state.queue.enqueue_modify(ModifyTask::Move {
        dragged_id,
        target_id,
    });
    Ok(accepted("Move action queued"))
}

fn accepted(message: &str) -> impl IntoResponse {
    (StatusCode::ACCEPTED, MessageBody::new(message))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))
}

fn required_id(body: &Value, field: &str) -> Result<ItemId, AppError> {
    body.get(field)
        .and_then(as_item_id)
        .ok_or_else(|| AppError::Validation(format!("Invalid {field} provided")))
}

fn as_item_id(value: &Value) -> Option<ItemId> {
    value.as_u64().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_required_id_accepts_positive_integers_only() {
        assert_eq!(required_id(&json!({ "id": 12 }), "id").ok(), Some(12));
        assert!(required_id(&json!({ "id": 0 }), "id").is_err());
        assert!(required_id(&json!({ "id": -4 }), "id").is_err());
        assert!(required_id(&json!({ "id": 1.5 }), "id").is_err());
        assert!(required_id(&json!({ "id": "12" }), "id").is_err());
        assert!(required_id(&json!({}), "id").is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery {
            page: Some("x".to_string()),
            ..PageQuery::default()
        };
        assert_eq!(query.to_request(), PageRequest::new(1, 20, ""));
    }

    #[tokio::test]
    async fn test_read_view_runs_off_the_async_worker() {
        let caller = std::thread::current().id();

        let Json(page) = read_view(move || {
            assert_ne!(std::thread::current().id(), caller);
            Page {
                items: Vec::new(),
                total_count: 3,
            }
        })
        .await
        .unwrap();

        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_read_view_panic_is_internal_error() {
        let result = read_view(|| panic!("walk failed")).await;

        assert!(matches!(result, Err(AppError::Other(_))));
    }
}
