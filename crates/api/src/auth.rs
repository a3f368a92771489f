use academy_core::model::{User, UserId};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};

use crate::error::ApiError;
use crate::state::ApiState;

/// Header set by the authenticating gateway in front of the API.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Maps request headers to the caller's identity.
///
/// Token issuance and verification live outside this service; an
/// implementation only has to say who the request is for.
pub trait Authenticator: Send + Sync {
    /// Returns `None` when the request carries no usable identity.
    fn authenticate(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Trusts a numeric user id placed in a header by an upstream gateway.
#[derive(Debug, Clone)]
pub struct TrustedHeaderAuthenticator {
    header: HeaderName,
}

impl TrustedHeaderAuthenticator {
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl Default for TrustedHeaderAuthenticator {
    fn default() -> Self {
        Self::new(HeaderName::from_static(USER_ID_HEADER))
    }
}

impl Authenticator for TrustedHeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<UserId> {
        headers
            .get(&self.header)?
            .to_str()
            .ok()?
            .parse::<UserId>()
            .ok()
    }
}

/// The authenticated, active account behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = state
            .authenticator
            .authenticate(&parts.headers)
            .ok_or(ApiError::Unauthorized)?;
        let user = state.services.accounts().authorize(user_id).await?;
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_numeric_id_from_gateway_header() {
        let auth = TrustedHeaderAuthenticator::default();
        let mut headers = HeaderMap::new();
        assert_eq!(auth.authenticate(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(auth.authenticate(&headers), Some(UserId::new(42)));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("admin"));
        assert_eq!(auth.authenticate(&headers), None);
    }
}
