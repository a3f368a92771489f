use academy_core::model::{
    AuthProvider, Course, CourseId, CourseResource, Lesson, LessonId, Module, ModuleId, Price,
    ProgressId, ProgressRecord, ResourceId, ResourceType, User, UserId, parse_url,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i64_to_i32(field: &'static str, v: i64) -> Result<i32, StorageError> {
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Row key for a read lookup. Ids past `i64::MAX` cannot have been stored,
/// so callers treat `None` as "no such row".
pub(crate) fn lookup_key(v: u64) -> Option<i64> {
    i64::try_from(v).ok()
}

/// Map write-side sqlx failures, surfacing constraint violations as conflicts.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation() || db.is_unique_violation() =>
        {
            StorageError::Conflict
        }
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let provider: String = row.try_get("auth_provider").map_err(ser)?;
    User::new(
        UserId::new(i64_to_u64("user_id", row.try_get("id").map_err(ser)?)?),
        row.try_get::<String, _>("email").map_err(ser)?,
        row.try_get::<String, _>("username").map_err(ser)?,
        row.try_get("full_name").map_err(ser)?,
        AuthProvider::parse(&provider).map_err(ser)?,
        row.try_get("is_active").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_course_row(row: &sqlx::sqlite::SqliteRow) -> Result<Course, StorageError> {
    let price = Price::new(
        row.try_get::<f64, _>("price").map_err(ser)?,
        row.try_get::<String, _>("currency").map_err(ser)?,
    )
    .map_err(ser)?;
    let image_url = row
        .try_get::<Option<String>, _>("image_url")
        .map_err(ser)?
        .map(|raw| parse_url(&raw))
        .transpose()
        .map_err(ser)?;

    Course::new(
        CourseId::new(i64_to_u64("course_id", row.try_get("id").map_err(ser)?)?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        row.try_get("short_description").map_err(ser)?,
        price,
        image_url,
        row.try_get("is_active").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_module_row(row: &sqlx::sqlite::SqliteRow) -> Result<Module, StorageError> {
    Module::new(
        ModuleId::new(i64_to_u64("module_id", row.try_get("id").map_err(ser)?)?),
        CourseId::new(i64_to_u64("course_id", row.try_get("course_id").map_err(ser)?)?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        i64_to_i32("position", row.try_get("position").map_err(ser)?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson, StorageError> {
    let video_url: String = row.try_get("video_url").map_err(ser)?;
    let video_duration = row
        .try_get::<Option<i64>, _>("video_duration")
        .map_err(ser)?
        .map(|v| i64_to_u32("video_duration", v))
        .transpose()?;

    Lesson::new(
        LessonId::new(i64_to_u64("lesson_id", row.try_get("id").map_err(ser)?)?),
        ModuleId::new(i64_to_u64("module_id", row.try_get("module_id").map_err(ser)?)?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        parse_url(&video_url).map_err(ser)?,
        video_duration,
        i64_to_i32("position", row.try_get("position").map_err(ser)?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    Ok(ProgressRecord::from_persisted(
        ProgressId::new(i64_to_u64("progress_id", row.try_get("id").map_err(ser)?)?),
        UserId::new(i64_to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        LessonId::new(i64_to_u64("lesson_id", row.try_get("lesson_id").map_err(ser)?)?),
        i64_to_u32(
            "watched_duration",
            row.try_get("watched_duration").map_err(ser)?,
        )?,
        row.try_get("is_completed").map_err(ser)?,
        row.try_get("last_watched_at").map_err(ser)?,
    ))
}

pub(crate) fn map_resource_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CourseResource, StorageError> {
    let kind: String = row.try_get("resource_type").map_err(ser)?;
    let file_url = row
        .try_get::<Option<String>, _>("file_url")
        .map_err(ser)?
        .map(|raw| parse_url(&raw))
        .transpose()
        .map_err(ser)?;

    CourseResource::new(
        ResourceId::new(i64_to_u64("resource_id", row.try_get("id").map_err(ser)?)?),
        CourseId::new(i64_to_u64("course_id", row.try_get("course_id").map_err(ser)?)?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        ResourceType::parse(&kind).map_err(ser)?,
        file_url,
        row.try_get("file_name").map_err(ser)?,
        i64_to_i32("position", row.try_get("position").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
