use crate::api::{blocking, body_error, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreatedQuest, DayId, DayRecord, DayShift, OriginId, OriginRecord, QuestDayPage, QuestId, SaveOriginPayload,
    UpdateDayPayload,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/origin", get(list_origins).post(create_origin))
        .route("/origin/:id", get(get_origin).put(update_origin).delete(delete_origin))
        .route("/origin/:id/start", post(start_from_origin))
        .route("/quest", get(quest_day))
        .route("/quest/create", get(quest_form))
        .route("/quest/:id", delete(delete_quest))
        .route("/day/:id", put(update_day))
}

/// `?date=YYYY-MM-DD` picks the day; a bare `previous` or `next` key moves one day.
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    date: Option<String>,
    previous: Option<String>,
    next: Option<String>,
}

impl DayQuery {
    fn resolve(&self) -> ApiResult<(Option<NaiveDate>, DayShift)> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| AppError::validation("date", format!("'{}' is not a YYYY-MM-DD date", raw)))?,
            ),
        };
        let shift = if self.previous.is_some() {
            DayShift::Previous
        } else if self.next.is_some() {
            DayShift::Next
        } else {
            DayShift::Stay
        };
        Ok((date, shift))
    }
}

async fn quest_day(State(state): State<AppState>, Query(query): Query<DayQuery>) -> ApiResult<Json<QuestDayPage>> {
    let (date, shift) = query.resolve()?;
    let page = blocking(&state, move |core| core.quest_day_page(date, shift)).await?;
    Ok(Json(page))
}

async fn quest_form(State(state): State<AppState>) -> ApiResult<Response> {
    let form = blocking(&state, |core| core.quest_form()).await?;
    Ok(match form {
        Some(view) => Json(view).into_response(),
        None => Redirect::to("/origin").into_response(),
    })
}

async fn delete_quest(State(state): State<AppState>, Path(id): Path<QuestId>) -> ApiResult<StatusCode> {
    blocking(&state, move |core| core.delete_quest(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_day(
    State(state): State<AppState>,
    Path(id): Path<DayId>,
    payload: Result<Json<UpdateDayPayload>, JsonRejection>,
) -> ApiResult<Json<DayRecord>> {
    let Json(payload) = payload.map_err(body_error)?;
    let day = blocking(&state, move |core| core.update_day_content(id, &payload.content)).await?;
    Ok(Json(day))
}

async fn list_origins(State(state): State<AppState>) -> ApiResult<Json<Vec<OriginRecord>>> {
    Ok(Json(blocking(&state, |core| core.list_origins()).await?))
}

async fn get_origin(State(state): State<AppState>, Path(id): Path<OriginId>) -> ApiResult<Json<OriginRecord>> {
    Ok(Json(blocking(&state, move |core| core.get_origin(id)).await?))
}

async fn create_origin(
    State(state): State<AppState>,
    payload: Result<Json<SaveOriginPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OriginRecord>)> {
    let Json(payload) = payload.map_err(body_error)?;
    let origin = blocking(&state, move |core| core.create_origin(payload)).await?;
    Ok((StatusCode::CREATED, Json(origin)))
}

async fn update_origin(
    State(state): State<AppState>,
    Path(id): Path<OriginId>,
    payload: Result<Json<SaveOriginPayload>, JsonRejection>,
) -> ApiResult<Json<OriginRecord>> {
    let Json(payload) = payload.map_err(body_error)?;
    Ok(Json(blocking(&state, move |core| core.update_origin(id, payload)).await?))
}

async fn delete_origin(State(state): State<AppState>, Path(id): Path<OriginId>) -> ApiResult<StatusCode> {
    blocking(&state, move |core| core.delete_origin(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_from_origin(
    State(state): State<AppState>,
    Path(id): Path<OriginId>,
) -> ApiResult<(StatusCode, Json<CreatedQuest>)> {
    let started = blocking(&state, move |core| core.start_quest_from_origin(id)).await?;
    Ok((StatusCode::CREATED, Json(started)))
}
