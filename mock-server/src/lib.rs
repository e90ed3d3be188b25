//! In-memory implementation of the todo HTTP contract.
//!
//! Every response is a `{ success, data?, message? }` envelope. Items are
//! kept newest-first, and due dates are echoed as midnight-UTC timestamps
//! the way document-store backends return them.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<NaiveDate>,
}

/// `dueDate: null` clears the date; an absent `dueDate` leaves it alone.
#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    #[serde(rename = "dueDate", default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

#[derive(Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Todo not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadPayload(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Envelope::<()> {
            success: false,
            data: None,
            message: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadPayload(rejection.body_text())
    }
}

pub type Db = Arc<RwLock<Vec<Todo>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new().nest("/api", api_routes()).with_state(db)
}

fn api_routes() -> Router<Db> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .route("/todos/{id}/toggle", patch(toggle_todo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock todo server listening");
    }
    axum::serve(listener, app()).await
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn required_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}

async fn list_todos(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<Envelope<Vec<Todo>>> {
    let todos = db.read().await;
    let matching: Vec<Todo> = todos
        .iter()
        .filter(|t| params.completed.map_or(true, |c| t.completed == c))
        .filter(|t| params.priority.map_or(true, |p| t.priority == p))
        .cloned()
        .collect();
    debug!(count = matching.len(), "list");
    Envelope::ok(matching)
}

async fn create_todo(
    State(db): State<Db>,
    input: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), AppError> {
    let Json(input) = input?;
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: required_title(&input.title)?,
        completed: false,
        priority: input.priority,
        due_date: input.due_date.map(midnight_utc),
        created_at: Utc::now(),
    };
    db.write().await.insert(0, todo.clone());
    debug!(id = %todo.id, "created");
    Ok((StatusCode::CREATED, Envelope::ok(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let Json(input) = input?;
    let title = input.title.as_deref().map(required_title).transpose()?;

    let mut todos = db.write().await;
    let todo = todos.iter_mut().find(|t| t.id == id).ok_or(AppError::NotFound)?;
    if let Some(title) = title {
        todo.title = title;
    }
    if let Some(priority) = input.priority {
        todo.priority = priority;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    if let Some(due_date) = input.due_date {
        todo.due_date = due_date.map(midnight_utc);
    }
    Ok(Envelope::ok(todo.clone()))
}

async fn toggle_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let mut todos = db.write().await;
    let todo = todos.iter_mut().find(|t| t.id == id).ok_or(AppError::NotFound)?;
    todo.completed = !todo.completed;
    Ok(Envelope::ok(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, AppError> {
    let mut todos = db.write().await;
    let before = todos.len();
    todos.retain(|t| t.id != id);
    if todos.len() == before {
        return Err(AppError::NotFound);
    }
    Ok(Json(Envelope {
        success: true,
        data: None,
        message: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_wire_shape() {
        let todo = Todo {
            id: "1".to_string(),
            title: "Test".to_string(),
            completed: false,
            priority: Priority::Medium,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1).map(midnight_utc),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["dueDate"], "2024-05-01T00:00:00Z");
    }

    #[test]
    fn todo_without_due_date_omits_field() {
        let todo = Todo {
            id: "1".to_string(),
            title: "Test".to_string(),
            completed: true,
            priority: Priority::Low,
            due_date: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("dueDate").is_none());
    }

    #[test]
    fn create_todo_defaults_priority_to_low() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"No priority"}"#).unwrap();
        assert_eq!(input.priority, Priority::Low);
        assert!(input.due_date.is_none());
    }

    #[test]
    fn create_todo_rejects_missing_title() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"priority":"high"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_todo_distinguishes_null_from_absent() {
        let absent: UpdateTodo = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.due_date, None);

        let cleared: UpdateTodo = serde_json::from_str(r#"{"dueDate":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTodo = serde_json::from_str(r#"{"dueDate":"2024-01-02"}"#).unwrap();
        assert_eq!(set.due_date, Some(NaiveDate::from_ymd_opt(2024, 1, 2)));
    }

    #[test]
    fn failure_envelope_decodes_without_data() {
        let envelope: Envelope<Todo> =
            serde_json::from_str(r#"{"success":false,"message":"Todo not found"}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Todo not found"));
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert!(matches!(required_title("  "), Err(AppError::Validation(_))));
        assert_eq!(required_title(" Walk dog ").unwrap(), "Walk dog");
    }
}
