use academy_core::model::{CourseId, CourseResource};

use super::{
    SqliteRepository,
    mapping::{conn, id_to_i64, lookup_key, map_resource_row, write_err},
};
use crate::repository::{ResourceRepository, StorageError};

#[async_trait::async_trait]
impl ResourceRepository for SqliteRepository {
    async fn upsert_resource(&self, resource: &CourseResource) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_resources (
                id, course_id, title, description, resource_type, file_url, file_name,
                position, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                title = excluded.title,
                description = excluded.description,
                resource_type = excluded.resource_type,
                file_url = excluded.file_url,
                file_name = excluded.file_name,
                position = excluded.position
            ",
        )
        .bind(id_to_i64("resource_id", resource.id().value())?)
        .bind(id_to_i64("course_id", resource.course_id().value())?)
        .bind(resource.title())
        .bind(resource.description())
        .bind(resource.resource_type().as_str())
        .bind(resource.file_url().map(|u| u.as_str()))
        .bind(resource.file_name())
        .bind(resource.order())
        .bind(resource.created_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn resources_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, StorageError> {
        let Some(key) = lookup_key(course_id.value()) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            r"
            SELECT
                id, course_id, title, description, resource_type, file_url, file_name,
                position, created_at
            FROM course_resources
            WHERE course_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_resource_row).collect()
    }
}
