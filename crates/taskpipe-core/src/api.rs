//! Wire-contract DTOs for the external routing layer.
//!
//! The HTTP surface itself (routing, auth middleware) lives outside this
//! crate; these types pin down the request/response shapes it must speak.
//!
//! | Operation | Method + path | Success | Failure |
//! |---|---|---|---|
//! | List | GET `/{owner}/todos` | 200 `TodoListResponse` | 403 |
//! | Create | POST `/{owner}/todos` | 200 `TodoResponse` | 403, 422 |
//! | Get | GET `/{owner}/todos/{id}` | 200 `TodoResponse` | 403, 404 |
//! | Update | PUT `/{owner}/todos/{id}` | 200 `TodoResponse` | 403, 404, 422 |
//! | Delete | DELETE `/{owner}/todos/{id}` | 200 `DeleteTodoResponse` | 403, 404 |
//! | Toggle | PATCH `/{owner}/todos/{id}/complete` | 200 `TodoResponse` | 403, 404 |
//!
//! Error bodies use [`ErrorResponse`]; the status comes from
//! [`Error::status`](crate::error::Error::status).

use crate::error::Error;
use crate::model::{Task, TaskDraft, TaskId, TaskPatch, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of POST `/{owner}/todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreateTodoRequest> for TaskDraft {
    fn from(request: CreateTodoRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

/// Body of PUT `/{owner}/todos/{id}`. Unset fields retain prior values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateTodoRequest> for TaskPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

/// Body of PATCH `/{owner}/todos/{id}/complete`.
///
/// `completed` absent or null both deserialize to `None`, which means
/// "flip the current value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToggleCompleteRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

/// One task record as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TodoResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            user_id: task.owner_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl From<Task> for TodoResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

/// Response of GET `/{owner}/todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub count: usize,
}

impl TodoListResponse {
    /// Build the list response from repository output.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let todos: Vec<TodoResponse> = tasks.iter().map(TodoResponse::from).collect();
        Self {
            count: todos.len(),
            todos,
        }
    }
}

/// Response of DELETE `/{owner}/todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteTodoResponse {
    /// The canonical success body.
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: "Todo deleted successfully".to_string(),
        }
    }
}

/// Error body for every failure status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_code: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            error_code: error.code().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task() -> Task {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("valid");
        Task {
            id: TaskId::generate(),
            owner_id: UserId::generate(),
            title: "Buy milk".into(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn toggle_request_treats_absent_and_null_alike() {
        let absent: ToggleCompleteRequest = serde_json::from_str("{}").expect("parse");
        let null: ToggleCompleteRequest =
            serde_json::from_str(r#"{"completed": null}"#).expect("parse");
        assert_eq!(absent.completed, None);
        assert_eq!(null.completed, None);

        let explicit: ToggleCompleteRequest =
            serde_json::from_str(r#"{"completed": true}"#).expect("parse");
        assert_eq!(explicit.completed, Some(true));
    }

    #[test]
    fn list_response_counts_its_todos() {
        let tasks = vec![task(), task(), task()];
        let response = TodoListResponse::from_tasks(&tasks);
        assert_eq!(response.count, 3);
        assert_eq!(response.todos.len(), 3);
    }

    #[test]
    fn todo_response_uses_user_id_field_name() {
        let t = task();
        let value = serde_json::to_value(TodoResponse::from(&t)).expect("serialize");
        assert!(value.get("user_id").is_some());
        assert!(value.get("owner_id").is_none());
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let response = ErrorResponse::from(&Error::NotFound);
        assert!(!response.success);
        assert_eq!(response.error_code, "not_found");
        assert_eq!(response.message, "todo not found");
    }

    #[test]
    fn create_request_converts_to_draft() {
        let request: CreateTodoRequest =
            serde_json::from_str(r#"{"title": "Buy milk"}"#).expect("parse");
        let draft = TaskDraft::from(request);
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, None);
    }
}
