use academy_core::model::{User, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, id_to_i64, lookup_key, map_user_row, write_err},
};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, username, full_name, auth_provider, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                username = excluded.username,
                full_name = excluded.full_name,
                auth_provider = excluded.auth_provider,
                is_active = excluded.is_active
            ",
        )
        .bind(id_to_i64("user_id", user.id().value())?)
        .bind(user.email())
        .bind(user.username())
        .bind(user.full_name())
        .bind(user.auth_provider().as_str())
        .bind(user.is_active())
        .bind(user.created_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let Some(key) = lookup_key(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, email, username, full_name, auth_provider, is_active, created_at
            FROM users
            WHERE id = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }
}
