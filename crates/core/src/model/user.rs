use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email must contain a local part and a domain")]
    InvalidEmail,

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("unknown auth provider: {0}")]
    UnknownProvider(String),
}

/// How the account signs in. Credential handling lives outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProvider {
    Email,
    Google,
}

impl AuthProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
        }
    }

    /// # Errors
    ///
    /// Returns `UserError::UnknownProvider` for unrecognised values.
    pub fn parse(raw: &str) -> Result<Self, UserError> {
        match raw {
            "email" => Ok(Self::Email),
            "google" => Ok(Self::Google),
            other => Err(UserError::UnknownProvider(other.to_owned())),
        }
    }
}

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: String,
    username: String,
    full_name: Option<String>,
    auth_provider: AuthProvider,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// # Errors
    ///
    /// Returns `UserError::InvalidEmail` or `UserError::EmptyUsername` when
    /// the identity fields are malformed.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        full_name: Option<String>,
        auth_provider: AuthProvider,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let email = email.into().trim().to_owned();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(UserError::InvalidEmail),
        }
        let username = username.into().trim().to_owned();
        if username.is_empty() {
            return Err(UserError::EmptyUsername);
        }

        Ok(Self {
            id,
            email,
            username,
            full_name: full_name.filter(|n| !n.trim().is_empty()),
            auth_provider,
            is_active,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    #[must_use]
    pub fn auth_provider(&self) -> AuthProvider {
        self.auth_provider
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
