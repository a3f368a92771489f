use academy_core::model::{LessonId, ProgressRecord, UserId, WatchUpdate};

use super::{
    SqliteRepository,
    mapping::{conn, id_to_i64, lookup_key, map_progress_row, write_err},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let (Some(user_key), Some(lesson_key)) =
            (lookup_key(user_id.value()), lookup_key(lesson_id.value()))
        else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, user_id, lesson_id, watched_duration, is_completed, last_watched_at
            FROM progress
            WHERE user_id = ?1 AND lesson_id = ?2
            ",
        )
        .bind(user_key)
        .bind(lesson_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn progress_for_lessons(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let Some(user_key) = lookup_key(user_id.value()) else {
            return Ok(Vec::new());
        };
        let lesson_keys: Vec<i64> = lesson_ids
            .iter()
            .filter_map(|id| lookup_key(id.value()))
            .collect();
        if lesson_keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
            SELECT id, user_id, lesson_id, watched_duration, is_completed, last_watched_at
            FROM progress
            WHERE user_id = ?1 AND lesson_id IN (
            ",
        );
        for i in 0..lesson_keys.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push_str(")\n");

        let mut q = sqlx::query(&sql).bind(user_key);
        for key in lesson_keys {
            q = q.bind(key);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_progress_row).collect()
    }

    /// Single-statement upsert, so the merge is atomic per `(user_id, lesson_id)`.
    async fn record_watch(&self, update: &WatchUpdate) -> Result<ProgressRecord, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO progress (
                user_id, lesson_id, watched_duration, is_completed, last_watched_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                watched_duration = CASE
                    WHEN ?6 IS NULL
                        THEN MAX(progress.watched_duration, excluded.watched_duration)
                    ELSE MIN(MAX(progress.watched_duration, excluded.watched_duration), ?6)
                END,
                is_completed = (progress.is_completed OR excluded.is_completed),
                last_watched_at = excluded.last_watched_at
            RETURNING id, user_id, lesson_id, watched_duration, is_completed, last_watched_at
            ",
        )
        .bind(id_to_i64("user_id", update.user_id().value())?)
        .bind(id_to_i64("lesson_id", update.lesson_id().value())?)
        .bind(i64::from(update.watched()))
        .bind(update.completed())
        .bind(update.at())
        .bind(update.cap().map(i64::from))
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        map_progress_row(&row)
    }
}
