//! HTTP surface over a `TodoRepository`.
//!
//! Store calls are blocking, so each handler moves its repository call onto
//! tokio's blocking pool. Every failure is answered with an `ErrorBody`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use thiserror::Error;
use todo_core::{DeleteConfirmation, ErrorBody, Todo, TodoFields, TodoId};
use tracing::{error, warn};

use crate::repo::{RepoError, RepoResult, TodoRepository};

/// Repository handle shared by every handler.
pub type SharedRepository = Arc<dyn TodoRepository>;

/// Handler failure, mapped one-to-one onto a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Storage(_) => "storage_error",
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        let message = err.to_string();
        match err {
            RepoError::Validation(_) => ApiError::BadRequest(message),
            RepoError::NotFound(_) => ApiError::NotFound(message),
            RepoError::Storage(_) => {
                error!(error = %message, "storage failure");
                ApiError::Storage(format!("storage failure: {message}"))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("invalid path parameter: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!(status = status.as_u16(), message = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(repo: SharedRepository) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/client/{name}", get(list_todos_by_client))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .with_state(repo)
}

/// Run a repository call on the blocking pool.
async fn blocking<T, F>(repo: &SharedRepository, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoRepository) -> RepoResult<T> + Send + 'static,
{
    let repo = Arc::clone(repo);
    tokio::task::spawn_blocking(move || op(&*repo))
        .await
        .map_err(|e| {
            error!(error = %e, "repository task failed");
            ApiError::Storage("storage failure: repository task failed".to_string())
        })?
        .map_err(ApiError::from)
}

async fn list_todos(State(repo): State<SharedRepository>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = blocking(&repo, |r| r.list_all()).await?;
    Ok(Json(todos))
}

async fn list_todos_by_client(
    State(repo): State<SharedRepository>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Path(name) = name?;
    let todos = blocking(&repo, move |r| r.list_by_client(&name)).await?;
    Ok(Json(todos))
}

async fn get_todo(
    State(repo): State<SharedRepository>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let todo = blocking(&repo, move |r| r.get(id)).await?;
    Ok(Json(todo))
}

async fn create_todo(
    State(repo): State<SharedRepository>,
    input: Result<Json<TodoFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(fields) = input?;
    let todo = blocking(&repo, move |r| r.create(fields)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(repo): State<SharedRepository>,
    id: Result<Path<TodoId>, PathRejection>,
    input: Result<Json<TodoFields>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(fields) = input?;
    let todo = blocking(&repo, move |r| r.update(id, fields)).await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(repo): State<SharedRepository>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let Path(id) = id?;
    blocking(&repo, move |r| r.delete(id)).await?;
    Ok(Json(DeleteConfirmation::new(id)))
}

#[cfg(test)]
mod tests {
    use todo_core::ValidationError;

    use super::*;
    use crate::store::StoreError;

    #[test]
    fn repo_errors_map_to_status_codes() {
        let validation: ApiError = RepoError::Validation(ValidationError::MissingTask).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.kind(), "validation_error");
        assert_eq!(validation.to_string(), "task is required");

        let not_found: ApiError = RepoError::NotFound(4).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "todo with id 4 not found");

        let storage: ApiError = RepoError::Storage(StoreError::Poisoned).into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.kind(), "storage_error");
        assert!(storage.to_string().starts_with("storage failure: "));
    }
}
