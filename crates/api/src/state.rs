use std::sync::Arc;

use services::AppServices;

use crate::auth::Authenticator;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub services: AppServices,
    pub authenticator: Arc<dyn Authenticator>,
}

impl ApiState {
    #[must_use]
    pub fn new(services: AppServices, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            services,
            authenticator,
        }
    }
}
