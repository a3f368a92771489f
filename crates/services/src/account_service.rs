use std::sync::Arc;

use academy_core::model::{User, UserId};
use storage::repository::UserRepository;
use tracing::warn;

use crate::error::AccountError;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if no such user exists.
    /// Returns `AccountError::Storage` if repository access fails.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AccountError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))
    }

    /// Resolve an authenticated identity to an active account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Unauthorized` if the user does not exist and
    /// `AccountError::Forbidden` if the account is deactivated.
    /// Returns `AccountError::Storage` if repository access fails.
    pub async fn authorize(&self, user_id: UserId) -> Result<User, AccountError> {
        let Some(user) = self.users.get_user(user_id).await? else {
            warn!(user_id = %user_id, "authenticated id has no account");
            return Err(AccountError::Unauthorized);
        };
        if !user.is_active() {
            warn!(user_id = %user_id, "inactive account rejected");
            return Err(AccountError::Forbidden(user_id));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::model::AuthProvider;
    use academy_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn service_with(active: bool) -> AccountService {
        let repo = InMemoryRepository::new();
        let user = User::new(
            UserId::new(1),
            "test@example.com",
            "testuser",
            None,
            AuthProvider::Google,
            active,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_user(&user).await.unwrap();
        AccountService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn authorize_accepts_active_users() {
        let svc = service_with(true).await;
        let user = svc.authorize(UserId::new(1)).await.unwrap();
        assert_eq!(user.email(), "test@example.com");
    }

    #[tokio::test]
    async fn authorize_distinguishes_missing_and_inactive() {
        let svc = service_with(false).await;
        assert!(matches!(
            svc.authorize(UserId::new(1)).await.unwrap_err(),
            AccountError::Forbidden(_)
        ));
        assert!(matches!(
            svc.authorize(UserId::new(2)).await.unwrap_err(),
            AccountError::Unauthorized
        ));
    }

    #[tokio::test]
    async fn get_user_reports_missing_accounts() {
        let svc = service_with(true).await;
        assert!(matches!(
            svc.get_user(UserId::new(5)).await.unwrap_err(),
            AccountError::UserNotFound(id) if id == UserId::new(5)
        ));
    }
}
