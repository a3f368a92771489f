use academy_core::model::CourseId;
use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::ApiState;
use crate::wire::ResourceResponse;

pub(super) async fn for_course(
    State(state): State<ApiState>,
    CurrentUser(_user): CurrentUser,
    ApiPath(course_id): ApiPath<CourseId>,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    let resources = state
        .services
        .resources()
        .resources_for_course(course_id)
        .await?;
    Ok(Json(resources.iter().map(ResourceResponse::from).collect()))
}
