//! HTTP layer for the to-do API.
//!
//! Two equivalent route sets are mounted, `/api/todos` and `/api/todo`. The
//! `Location` header and the `uri` in response envelopes point back into the
//! route set the request arrived on.

pub mod config;
pub mod error;
pub mod telemetry;

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, Request, Response, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use todo_core::{SharedRepository, StorageError, TodoItem, TodoPayload, ValidationError};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::error::ApiError;

pub const ROUTE_SETS: [&str; 2] = ["/api/todos", "/api/todo"];

const MODEL_ERRORS: &str = "Model Errors";

/// Shared handler state: the repository plus an optional public base URL.
#[derive(Clone)]
pub struct AppState {
    repo: SharedRepository,
    public_url: Option<String>,
}

impl AppState {
    pub fn new(repo: SharedRepository) -> Self {
        Self {
            repo,
            public_url: None,
        }
    }

    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url.map(|url| url.trim_end_matches('/').to_string());
        self
    }

    /// Absolute URL for `path`, based on the configured public URL or the
    /// request's `Host` header. Falls back to the bare path.
    fn link(&self, headers: &HeaderMap, path: &str) -> String {
        if let Some(base) = &self.public_url {
            return format!("{base}{path}");
        }
        match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
            Some(host) => format!("http://{host}{path}"),
            None => path.to_string(),
        }
    }
}

/// Body of successful create and update responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
    pub uri: String,
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new();
    for base in ROUTE_SETS {
        router = router
            .route(base, get(list_todos).post(create_todo))
            .route(
                &format!("{base}/{{id}}"),
                get(get_todo).put(update_todo).delete(delete_todo),
            );
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                        http.status = res.status().as_u16(),
                        elapsed_ms = latency.as_millis() as u64,
                        "request handled"
                    );
                }),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server keeps
/// running instead of shutting down straight after startup.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// Turn a body into a validated value. `reject` builds the error for an
/// unreadable or invalid body from its description.
fn validate<T>(
    payload: Result<Json<TodoPayload>, JsonRejection>,
    check: impl FnOnce(TodoPayload) -> Result<T, ValidationError>,
    reject: impl FnOnce(String) -> ApiError,
) -> Result<T, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable todo body");
            return Err(reject(rejection.body_text()));
        }
    };
    check(payload).map_err(|err| {
        tracing::debug!(error = %err, "invalid todo body");
        reject(err.to_string())
    })
}

/// Create rejects every bad body with the same 400.
fn model_errors(_: String) -> ApiError {
    ApiError::bad_request(MODEL_ERRORS)
}

fn envelope(status: StatusCode, message: &str, uri: String) -> impl IntoResponse {
    (
        status,
        [(header::LOCATION, uri.clone())],
        Json(MessageEnvelope {
            message: message.to_string(),
            uri,
        }),
    )
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = state.repo.list().await.map_err(|err| {
        tracing::warn!(error = %err, "listing todos failed");
        ApiError::internal(err.to_string())
    })?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, ApiError> {
    match state.repo.get(&id).await {
        Ok(Some(todo)) => Ok(Json(todo)),
        Ok(None) | Err(StorageError::InvalidId(_)) => {
            Err(ApiError::not_found(format!("Todo {id} not found")))
        }
        Err(err) => {
            tracing::warn!(id = %id, error = %err, "fetching todo failed");
            Err(ApiError::internal(err.to_string()))
        }
    }
}

async fn create_todo(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = validate(payload, TodoPayload::into_new_todo, model_errors)?;

    let created = state.repo.add(todo).await.map_err(|err| {
        tracing::warn!(error = %err, "adding todo failed");
        ApiError::bad_request(err.to_string())
    })?;

    let path = format!("{}/{}", uri.path().trim_end_matches('/'), created.id);
    let location = state.link(&headers, &path);
    tracing::info!(id = %created.id, "todo created");
    Ok(envelope(StatusCode::CREATED, "Todo created", location))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // Update only ever fails with 404, a bad body included.
    let changes = validate(payload, TodoPayload::into_changes, ApiError::not_found)?;

    match state.repo.update(&id, changes).await {
        Ok(true) => {
            let location = state.link(&headers, uri.path());
            Ok(envelope(StatusCode::OK, "Todo successfully updated", location))
        }
        Ok(false) => Err(ApiError::not_found("Unable to update todo")),
        Err(err) => {
            tracing::warn!(id = %id, error = %err, "updating todo failed");
            Err(ApiError::not_found(err.to_string()))
        }
    }
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.repo.delete(&id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(ApiError::not_found("Unable to delete todo")),
        Err(err) => {
            tracing::warn!(id = %id, error = %err, "deleting todo failed");
            Err(ApiError::not_found(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::Arc;
    use todo_core::MemoryRepository;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryRepository::new()))
    }

    #[test]
    fn link_prefers_public_url() {
        let state = state().with_public_url(Some("https://todo.example.com/".to_string()));
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        assert_eq!(
            state.link(&headers, "/api/todos/1"),
            "https://todo.example.com/api/todos/1"
        );
    }

    #[test]
    fn link_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        assert_eq!(
            state().link(&headers, "/api/todo/1"),
            "http://localhost:3000/api/todo/1"
        );
    }

    #[test]
    fn link_without_host_is_path_only() {
        assert_eq!(state().link(&HeaderMap::new(), "/api/todos/1"), "/api/todos/1");
    }

    #[test]
    fn validate_maps_missing_task_to_model_errors() {
        let payload = Ok(Json(TodoPayload::default()));
        match validate(payload, TodoPayload::into_new_todo, model_errors) {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Model Errors"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn validate_passes_field_message_to_update_rejection() {
        let payload = Ok(Json(TodoPayload::default()));
        match validate(payload, TodoPayload::into_changes, ApiError::not_found) {
            Err(ApiError::NotFound(msg)) => assert!(msg.contains("task"), "{msg}"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn envelope_serializes_message_and_uri() {
        let json = serde_json::to_value(MessageEnvelope {
            message: "Todo created".to_string(),
            uri: "http://h/api/todos/1".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Todo created", "uri": "http://h/api/todos/1"})
        );
    }
}
