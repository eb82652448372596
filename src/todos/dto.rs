use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request body for creating a todo. Only `text` is required; category and
/// priority are stored verbatim, matching the permissive contract the
/// client relies on.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, with = "time::serde::iso8601::option")]
    pub due_date: Option<OffsetDateTime>,
}

/// Request body for toggling completion.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub completed: bool,
}

/// Response body for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
