use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

use super::dto::{CreateTodoRequest, DeleteResponse, UpdateTodoRequest};
use super::repo::Todo;

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = Todo::list_by_user(&state.db, user_id).await?;
    Ok(Json(todos))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Text is required".into()));
    }

    let todo = Todo::create(
        &state.db,
        user_id,
        text,
        payload.category.as_deref(),
        payload.priority.as_deref(),
        payload.due_date,
    )
    .await?;

    info!(user_id = %user_id, todo_id = %todo.id, "todo created");
    Ok(Json(todo))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let todo = Todo::set_completed(&state.db, user_id, id, payload.completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found or unauthorized".into()))?;

    info!(user_id = %user_id, todo_id = %todo.id, completed = todo.completed, "todo updated");
    Ok(Json(todo))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = Todo::delete(&state.db, user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Todo not found or unauthorized".into()));
    }

    info!(user_id = %user_id, todo_id = %id, "todo deleted");
    Ok(Json(DeleteResponse {
        message: "Todo deleted".into(),
    }))
}
