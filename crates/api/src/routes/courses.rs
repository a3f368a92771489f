use academy_core::model::CourseId;
use axum::{Json, extract::State};
use serde::Deserialize;
use services::DEFAULT_PAGE_LIMIT;

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::ApiState;
use crate::wire::{CourseDetailResponse, CourseListResponse, CourseResponse};

#[derive(Debug, Deserialize)]
pub(super) struct Paging {
    skip: Option<i64>,
    limit: Option<i64>,
}

pub(super) async fn list_courses(
    State(state): State<ApiState>,
    ApiQuery(paging): ApiQuery<Paging>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let page = state
        .services
        .catalog()
        .list_courses(
            paging.skip.unwrap_or(0),
            paging.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
        .await?;

    Ok(Json(CourseListResponse {
        courses: page.courses.iter().map(CourseResponse::from).collect(),
        total: page.total,
    }))
}

pub(super) async fn get_course(
    State(state): State<ApiState>,
    ApiPath(course_id): ApiPath<CourseId>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let outline = state.services.catalog().get_course(course_id).await?;
    Ok(Json(CourseDetailResponse::from(&outline)))
}
