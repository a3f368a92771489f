//! JSON request and response bodies.

use academy_core::model::{
    Course, CourseId, CourseOutline, CourseProgressSummary, CourseResource, Lesson, LessonId,
    ModuleId, ModuleOutline, ProgressRecord, ResourceId, User, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub auth_provider: &'static str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_owned(),
            username: user.username().to_owned(),
            full_name: user.full_name().map(str::to_owned),
            auth_provider: user.auth_provider().as_str(),
            is_active: user.is_active(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_owned(),
            description: course.description().map(str::to_owned),
            short_description: course.short_description().map(str::to_owned),
            price: course.price().amount(),
            currency: course.price().currency().to_owned(),
            image_url: course.image_url().map(ToString::to_string),
            is_active: course.is_active(),
            created_at: course.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_duration: Option<u32>,
    pub order: i32,
}

impl From<&Lesson> for LessonResponse {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id(),
            title: lesson.title().to_owned(),
            description: lesson.description().map(str::to_owned),
            video_url: lesson.video_url().to_string(),
            video_duration: lesson.video_duration(),
            order: lesson.order(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub id: ModuleId,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub lessons: Vec<LessonResponse>,
}

impl From<&ModuleOutline> for ModuleResponse {
    fn from(outline: &ModuleOutline) -> Self {
        Self {
            id: outline.module.id(),
            title: outline.module.title().to_owned(),
            description: outline.module.description().map(str::to_owned),
            order: outline.module.order(),
            lessons: outline.lessons.iter().map(LessonResponse::from).collect(),
        }
    }
}

/// Course fields flattened next to the ordered module tree.
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub modules: Vec<ModuleResponse>,
}

impl From<&CourseOutline> for CourseDetailResponse {
    fn from(outline: &CourseOutline) -> Self {
        Self {
            course: CourseResponse::from(outline.course()),
            modules: outline.modules().iter().map(ModuleResponse::from).collect(),
        }
    }
}

/// Body of `POST /api/v1/progress/update`.
#[derive(Debug, Deserialize)]
pub struct ProgressUpdateRequest {
    pub lesson_id: LessonId,
    pub watched_duration: i64,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Stored progress. Records that were never saved report `id` 0.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub id: u64,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub watched_duration: u32,
    pub is_completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

impl From<&ProgressRecord> for ProgressResponse {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            id: record.id().map_or(0, |id| id.value()),
            user_id: record.user_id(),
            lesson_id: record.lesson_id(),
            watched_duration: record.watched_duration(),
            is_completed: record.is_completed(),
            last_watched_at: record.last_watched_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseProgressResponse {
    pub course_id: CourseId,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub total_duration: u64,
    pub watched_duration: u64,
    pub progress_percentage: f64,
}

impl CourseProgressResponse {
    #[must_use]
    pub fn new(course_id: CourseId, summary: &CourseProgressSummary) -> Self {
        Self {
            course_id,
            total_lessons: summary.total_lessons,
            completed_lessons: summary.completed_lessons,
            total_duration: summary.total_duration,
            watched_duration: summary.watched_duration,
            progress_percentage: summary.progress_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: ResourceId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: &'static str,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&CourseResource> for ResourceResponse {
    fn from(resource: &CourseResource) -> Self {
        Self {
            id: resource.id(),
            course_id: resource.course_id(),
            title: resource.title().to_owned(),
            description: resource.description().map(str::to_owned),
            resource_type: resource.resource_type().as_str(),
            file_url: resource.file_url().map(ToString::to_string),
            file_name: resource.file_name().map(str::to_owned),
            order: resource.order(),
            created_at: resource.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_now;

    #[test]
    fn update_request_defaults_completion_flag() {
        let body: ProgressUpdateRequest =
            serde_json::from_str(r#"{"lesson_id": 4, "watched_duration": -3}"#).unwrap();
        assert_eq!(body.lesson_id, LessonId::new(4));
        assert_eq!(body.watched_duration, -3);
        assert_eq!(body.is_completed, None);
    }

    #[test]
    fn unwatched_progress_reports_zero_id_and_lookup_time() {
        let record = ProgressRecord::not_started(UserId::new(1), LessonId::new(2), fixed_now());
        let json = serde_json::to_value(ProgressResponse::from(&record)).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["watched_duration"], 0);
        assert_eq!(json["is_completed"], false);
        assert_eq!(
            json["last_watched_at"],
            serde_json::to_value(fixed_now()).unwrap()
        );
    }
}
