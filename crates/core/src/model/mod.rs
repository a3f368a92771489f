mod course;
mod ids;
mod progress;
mod resource;
mod user;

pub use course::{
    Course, CourseError, CourseOutline, Lesson, Module, ModuleOutline, Price, parse_url,
};
pub use ids::{CourseId, LessonId, ModuleId, ParseIdError, ProgressId, ResourceId, UserId};
pub use progress::{
    CourseProgressSummary, ProgressRecord, ProgressState, WatchUpdate, cap_watched,
    clamp_reported_seconds,
};
pub use resource::{CourseResource, ResourceError, ResourceType};
pub use user::{AuthProvider, User, UserError};
