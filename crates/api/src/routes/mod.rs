use std::time::Duration;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::state::ApiState;

mod account;
mod courses;
mod progress;
mod resources;
mod system;

/// Build the axum router (separated from the listener for testing).
pub fn router(state: ApiState, config: &ApiConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins().iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/v1/courses", get(courses::list_courses))
        .route("/api/v1/courses/", get(courses::list_courses))
        .route("/api/v1/courses/:course_id", get(courses::get_course))
        .route("/api/v1/account/me", get(account::me))
        .route("/api/v1/account/courses", get(account::courses))
        .route(
            "/api/v1/account/progress/:course_id",
            get(account::course_progress),
        )
        .route("/api/v1/progress/update", post(progress::update))
        .route("/api/v1/progress/lesson/:lesson_id", get(progress::lesson))
        .route(
            "/api/v1/resources/course/:course_id",
            get(resources::for_course),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
