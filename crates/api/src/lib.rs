#![forbid(unsafe_code)]

//! HTTP surface of the academy backend.
//!
//! [`router`] wires the JSON routes over an [`ApiState`]; the binary owns
//! the listener and shutdown.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod wire;

pub use auth::{Authenticator, CurrentUser, TrustedHeaderAuthenticator, USER_ID_HEADER};
pub use config::ApiConfig;
pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use routes::router;
pub use state::ApiState;
