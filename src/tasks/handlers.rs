use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::{
    dto::{ListTasksQuery, TaskBody},
    extractors::OwnedTask,
    repo::{ListedTask, Task},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, TASK_NOT_FOUND},
    state::AppState,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task).delete(delete_task))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<Vec<ListedTask>>, AppError> {
    let Query(query) = query?;
    let page = query.validate()?;
    let tasks = state.tasks.find_by_owner_paged(identity.id, page).await?;
    Ok(Json(tasks))
}

#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    payload: Result<Json<TaskBody>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Task>), AppError> {
    let Json(payload) = payload?;
    let task = payload.validate()?.into_new(identity.id);
    let task = state.tasks.insert(task).await?;
    info!(task_id = %task.id, "task created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/tasks/{}", task.id)) {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(task)))
}

#[instrument(skip_all, fields(task_id = %task.id))]
pub async fn get_task(OwnedTask(task): OwnedTask) -> Json<Task> {
    Json(task)
}

#[instrument(skip_all, fields(task_id = %task.id))]
pub async fn update_task(
    State(state): State<AppState>,
    OwnedTask(task): OwnedTask,
    payload: Result<Json<TaskBody>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Json(payload) = payload?;
    let changes = payload.validate()?.into_changes();
    let updated = state
        .tasks
        .update(task.id, changes)
        .await?
        .ok_or(AppError::NotFound(TASK_NOT_FOUND))?;
    info!(task_id = %updated.id, "task updated");
    Ok(Json(updated))
}

#[instrument(skip_all, fields(task_id = %task.id))]
pub async fn delete_task(
    State(state): State<AppState>,
    OwnedTask(task): OwnedTask,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.tasks.delete(task.id).await? {
        return Err(AppError::NotFound(TASK_NOT_FOUND));
    }
    info!(task_id = %task.id, "task deleted");
    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}
