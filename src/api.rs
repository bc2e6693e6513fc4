use crate::AppState;
use crate::errors::AppError;
use crate::journal::JournalCore;
use crate::models::{CategoryKind, CreateQuestPayload, CreatedQuest, EditQuestPayload, QuestDetail, QuestEditView, QuestId};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type ApiResult<T> = Result<T, AppError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/quest", post(create_quest))
        .route("/api/quest/:id", get(get_quest).put(edit_quest))
        .route("/api/meta/types", get(list_types))
}

async fn create_quest(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuestPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedQuest>)> {
    let Json(payload) = payload.map_err(body_error)?;
    let created = blocking(&state, move |core| core.create_quest(payload)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_quest(State(state): State<AppState>, Path(id): Path<QuestId>) -> ApiResult<Json<QuestEditView>> {
    let view = blocking(&state, move |core| core.quest_for_edit(id)).await?;
    Ok(Json(view))
}

async fn edit_quest(
    State(state): State<AppState>,
    Path(id): Path<QuestId>,
    payload: Result<Json<EditQuestPayload>, JsonRejection>,
) -> ApiResult<Json<QuestDetail>> {
    let Json(payload) = payload.map_err(body_error)?;
    let detail = blocking(&state, move |core| core.edit_quest(id, payload)).await?;
    Ok(Json(detail))
}

async fn list_types(State(state): State<AppState>) -> Json<BTreeMap<CategoryKind, BTreeMap<String, String>>> {
    Json(state.core.registry().snapshot())
}

/// Runs store work on the blocking pool; SQLite calls never run on the async workers.
pub(crate) async fn blocking<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&JournalCore) -> ApiResult<T> + Send + 'static,
{
    let core = Arc::clone(&state.core);
    tokio::task::spawn_blocking(move || work(&core))
        .await
        .map_err(|error| AppError::Internal(format!("request worker failed: {}", error)))?
}

pub(crate) fn body_error(rejection: JsonRejection) -> AppError {
    AppError::validation("body", rejection.body_text())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) | AppError::Integrity(errors) => {
                tracing::warn!(errors = %errors, "request rejected");
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response(),
            AppError::Io(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": detail }))).into_response()
            }
        }
    }
}
