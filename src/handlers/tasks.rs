//! Task CRUD handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::handlers::with_json_body;
use crate::http::server::AppState;
use crate::routing::RouteRequest;
use crate::store::{Task, TaskFilter, TaskPatch, TaskUpdate};

/// Keys a create body must carry, in the order they are reported.
const CREATE_REQUIRED_KEYS: [&str; 2] = ["description", "title"];

/// Keys a PUT body must carry; also the only keys a PATCH may carry.
const UPDATE_KEYS: [&str; 3] = ["description", "title", "completed_at"];

/// `GET /tasks[?search=...]`
pub fn list_tasks(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(with_json_body(state, request, list))
}

/// `POST /tasks`
pub fn create_task(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(with_json_body(state, request, create))
}

/// `PUT /tasks/:id`
pub fn update_task(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(with_json_body(state, request, update))
}

/// `PATCH /tasks/:id`
pub fn patch_task(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(with_json_body(state, request, patch))
}

/// `DELETE /tasks/:id`
pub fn delete_task(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(with_json_body(state, request, delete))
}

async fn list(
    state: AppState,
    request: RouteRequest,
    _body: Option<Value>,
) -> Result<Response, ApiError> {
    let filter = request
        .query_value("search")
        .filter(|search| !search.is_empty())
        .map(TaskFilter::search);

    let tasks = state.database.tasks().select_all(filter.as_ref()).await;
    Ok((StatusCode::OK, Json(tasks)).into_response())
}

async fn create(
    state: AppState,
    _request: RouteRequest,
    body: Option<Value>,
) -> Result<Response, ApiError> {
    insert_task(&state, body).await?;
    Ok(StatusCode::CREATED.into_response())
}

/// Validate `body` and insert a new task. Shared with the CSV import.
pub(crate) async fn insert_task(state: &AppState, body: Option<Value>) -> Result<Task, ApiError> {
    let fields = require_object(body)?;
    require_keys(&fields, &CREATE_REQUIRED_KEYS)?;

    let title = string_field(&fields, "title")?;
    let description = string_field(&fields, "description")?;
    let completed_at = match fields.get("completed_at") {
        Some(value) => timestamp_value("completed_at", value)?,
        None => None,
    };

    let task = Task::new(title, description, completed_at, Utc::now());
    state.database.tasks().insert(task.clone()).await?;

    tracing::info!(task_id = %task.id, "Task created");
    Ok(task)
}

async fn update(
    state: AppState,
    request: RouteRequest,
    body: Option<Value>,
) -> Result<Response, ApiError> {
    let id = require_id(&request)?;
    let fields = require_object(body)?;
    require_keys(&fields, &UPDATE_KEYS)?;

    let data = TaskUpdate {
        title: string_field(&fields, "title")?,
        description: string_field(&fields, "description")?,
        completed_at: timestamp_value("completed_at", &fields["completed_at"])?,
        updated_at: Utc::now(),
    };

    state.database.tasks().update(&id, data).await?;
    tracing::info!(task_id = %id, "Task updated");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn patch(
    state: AppState,
    request: RouteRequest,
    body: Option<Value>,
) -> Result<Response, ApiError> {
    let id = require_id(&request)?;
    let fields = require_object(body)?;

    if fields.keys().any(|key| !UPDATE_KEYS.contains(&key.as_str())) {
        return Err(ApiError::validation("Missing valid keys"));
    }

    let mut data = TaskPatch::new(Utc::now());
    if fields.contains_key("title") {
        data.title = Some(string_field(&fields, "title")?);
    }
    if fields.contains_key("description") {
        data.description = Some(string_field(&fields, "description")?);
    }
    if let Some(value) = fields.get("completed_at") {
        data.completed_at = Some(timestamp_value("completed_at", value)?);
    }

    state.database.tasks().partial_update(&id, data).await?;
    tracing::info!(task_id = %id, "Task patched");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn delete(
    state: AppState,
    request: RouteRequest,
    _body: Option<Value>,
) -> Result<Response, ApiError> {
    let id = require_id(&request)?;
    state.database.tasks().delete(&id).await?;
    tracing::info!(task_id = %id, "Task deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The `:id` parameter, owned so no borrow of the request outlives an await.
fn require_id(request: &RouteRequest) -> Result<String, ApiError> {
    request
        .param("id")
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::validation("Missing id"))
}

fn require_object(body: Option<Value>) -> Result<Map<String, Value>, ApiError> {
    match body {
        Some(Value::Object(fields)) => Ok(fields),
        _ => Err(ApiError::validation("Missing body request")),
    }
}

fn require_keys(fields: &Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Missing the following required keys: {}",
            missing.join(",")
        )))
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    match fields.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(invalid_value(key)),
    }
}

/// `null` and `""` mean "not completed"; anything else must be RFC 3339.
fn timestamp_value(key: &str, value: &Value) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) if raw.is_empty() => Ok(None),
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| invalid_value(key)),
        _ => Err(invalid_value(key)),
    }
}

fn invalid_value(key: &str) -> ApiError {
    ApiError::validation(format!("Invalid value for key: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_require_object() {
        assert!(require_object(Some(json!({}))).is_ok());

        for body in [None, Some(json!([])), Some(json!("text")), Some(json!(1))] {
            let err = require_object(body).unwrap_err();
            assert_eq!(err.to_string(), "Missing body request");
        }
    }

    #[test]
    fn test_missing_keys_are_listed_in_order() {
        let err = require_keys(&object(json!({})), &CREATE_REQUIRED_KEYS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing the following required keys: description,title"
        );

        let err = require_keys(&object(json!({ "title": "a" })), &CREATE_REQUIRED_KEYS)
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing the following required keys: description");

        let err = require_keys(&object(json!({ "title": "a", "description": "b" })), &UPDATE_KEYS)
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing the following required keys: completed_at");
    }

    #[test]
    fn test_null_value_counts_as_present() {
        let fields = object(json!({ "title": "a", "description": "b", "completed_at": null }));
        assert!(require_keys(&fields, &UPDATE_KEYS).is_ok());
    }

    #[test]
    fn test_string_field() {
        let fields = object(json!({ "title": "a", "description": 7 }));
        assert_eq!(string_field(&fields, "title").unwrap(), "a");
        assert_eq!(
            string_field(&fields, "description").unwrap_err().to_string(),
            "Invalid value for key: description"
        );
    }

    #[test]
    fn test_timestamp_value() {
        assert_eq!(timestamp_value("completed_at", &json!(null)).unwrap(), None);
        assert_eq!(timestamp_value("completed_at", &json!("")).unwrap(), None);

        let parsed = timestamp_value("completed_at", &json!("2024-03-01T10:00:00-03:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T13:00:00+00:00");

        assert!(timestamp_value("completed_at", &json!("yesterday")).is_err());
        assert!(timestamp_value("completed_at", &json!(true)).is_err());
    }
}
