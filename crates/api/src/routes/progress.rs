use academy_core::model::LessonId;
use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::ApiState;
use crate::wire::{ProgressResponse, ProgressUpdateRequest};

pub(super) async fn update(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProgressUpdateRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let record = state
        .services
        .progress()
        .record_watch_update(
            user.id(),
            body.lesson_id,
            body.watched_duration,
            body.is_completed,
        )
        .await?;
    Ok(Json(ProgressResponse::from(&record)))
}

pub(super) async fn lesson(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiPath(lesson_id): ApiPath<LessonId>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let record = state
        .services
        .progress()
        .get_lesson_progress(user.id(), lesson_id)
        .await?;
    Ok(Json(ProgressResponse::from(&record)))
}
