use academy_core::model::{
    Course, CourseId, CourseOutline, Lesson, LessonId, Module, ModuleId, ModuleOutline,
};

use super::{
    SqliteRepository,
    mapping::{
        conn, id_to_i64, lookup_key, map_course_row, map_lesson_row, map_module_row, ser, write_err,
    },
};
use crate::repository::{CatalogRepository, StorageError};

const COURSE_COLUMNS: &str = "id, title, description, short_description, price, currency, \
                              image_url, is_active, created_at";

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO courses (
                id, title, description, short_description, price, currency, image_url,
                is_active, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                short_description = excluded.short_description,
                price = excluded.price,
                currency = excluded.currency,
                image_url = excluded.image_url,
                is_active = excluded.is_active
            ",
        )
        .bind(id_to_i64("course_id", course.id().value())?)
        .bind(course.title())
        .bind(course.description())
        .bind(course.short_description())
        .bind(course.price().amount())
        .bind(course.price().currency())
        .bind(course.image_url().map(|u| u.as_str()))
        .bind(course.is_active())
        .bind(course.created_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_modules (id, course_id, title, description, position)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                title = excluded.title,
                description = excluded.description,
                position = excluded.position
            ",
        )
        .bind(id_to_i64("module_id", module.id().value())?)
        .bind(id_to_i64("course_id", module.course_id().value())?)
        .bind(module.title())
        .bind(module.description())
        .bind(module.order())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_lessons (
                id, module_id, title, description, video_url, video_duration, position
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                module_id = excluded.module_id,
                title = excluded.title,
                description = excluded.description,
                video_url = excluded.video_url,
                video_duration = excluded.video_duration,
                position = excluded.position
            ",
        )
        .bind(id_to_i64("lesson_id", lesson.id().value())?)
        .bind(id_to_i64("module_id", lesson.module_id().value())?)
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.video_url().as_str())
        .bind(lesson.video_duration().map(i64::from))
        .bind(lesson.order())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let Some(key) = lookup_key(id.value()) else {
            return Ok(None);
        };
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_course_row).transpose()
    }

    async fn list_active_courses(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Course>, StorageError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_active = 1 \
             ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_course_row).collect()
    }

    async fn count_active_courses(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        u64::try_from(count).map_err(ser)
    }

    async fn course_outline(&self, id: CourseId) -> Result<Option<CourseOutline>, StorageError> {
        let Some(course) = self.get_course(id).await? else {
            return Ok(None);
        };
        let course_id = id_to_i64("course_id", id.value())?;

        let module_rows = sqlx::query(
            r"
            SELECT id, course_id, title, description, position
            FROM course_modules
            WHERE course_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let lesson_rows = sqlx::query(
            r"
            SELECT l.id, l.module_id, l.title, l.description, l.video_url, l.video_duration,
                   l.position
            FROM course_lessons l
            JOIN course_modules m ON m.id = l.module_id
            WHERE m.course_id = ?1
            ORDER BY l.position ASC, l.id ASC
            ",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut modules = module_rows
            .iter()
            .map(|row| {
                Ok(ModuleOutline {
                    module: map_module_row(row)?,
                    lessons: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        for row in &lesson_rows {
            let lesson = map_lesson_row(row)?;
            let module_id: ModuleId = lesson.module_id();
            if let Some(outline) = modules.iter_mut().find(|m| m.module.id() == module_id) {
                outline.lessons.push(lesson);
            }
        }

        CourseOutline::new(course, modules).map(Some).map_err(ser)
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let Some(key) = lookup_key(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, module_id, title, description, video_url, video_duration, position
            FROM course_lessons
            WHERE id = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn lessons_for_course(&self, id: CourseId) -> Result<Option<Vec<Lesson>>, StorageError> {
        let outline = self.course_outline(id).await?;
        Ok(outline.map(|o| o.lessons().cloned().collect()))
    }
}
