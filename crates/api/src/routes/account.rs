use academy_core::model::CourseId;
use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::ApiState;
use crate::wire::{CourseProgressResponse, CourseResponse, UserResponse};

pub(super) async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

pub(super) async fn courses(
    State(state): State<ApiState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = state.services.catalog().active_courses().await?;
    Ok(Json(courses.iter().map(CourseResponse::from).collect()))
}

pub(super) async fn course_progress(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    ApiPath(course_id): ApiPath<CourseId>,
) -> Result<Json<CourseProgressResponse>, ApiError> {
    let summary = state
        .services
        .progress()
        .course_progress_summary(user.id(), course_id)
        .await?;
    Ok(Json(CourseProgressResponse::new(course_id, &summary)))
}
