use axum::http::HeaderValue;
use tracing::warn;

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

/// Router settings resolved by the binary at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    cors_origins: Vec<HeaderValue>,
}

impl ApiConfig {
    /// Build from a comma-separated origin list. Blank and malformed
    /// entries are skipped with a warning.
    #[must_use]
    pub fn from_origin_list(raw: &str) -> Self {
        let cors_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(origin, error = %e, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Self { cors_origins }
    }

    #[must_use]
    pub fn cors_origins(&self) -> &[HeaderValue] {
        &self.cors_origins
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_origin_list(DEFAULT_CORS_ORIGINS)
    }
}
