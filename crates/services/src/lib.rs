#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod progress_service;
pub mod resource_service;

pub use academy_core::Clock;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use catalog_service::{CatalogService, CoursePage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use error::{AccountError, AppServicesError, CatalogError, ProgressError};
pub use progress_service::ProgressService;
pub use resource_service::ResourceService;
