use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::resource_service::ResourceService;

/// Assembles the services the HTTP layer talks to.
#[derive(Clone)]
pub struct AppServices {
    accounts: Arc<AccountService>,
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    resources: Arc<ResourceService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over an existing storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let catalog = CatalogService::new(Arc::clone(&storage.catalog));
        let resources = ResourceService::new(catalog.clone(), Arc::clone(&storage.resources));
        let progress = ProgressService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.progress),
        );
        let accounts = AccountService::new(Arc::clone(&storage.users));

        Self {
            accounts: Arc::new(accounts),
            catalog: Arc::new(catalog),
            progress: Arc::new(progress),
            resources: Arc::new(resources),
        }
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn resources(&self) -> Arc<ResourceService> {
        Arc::clone(&self.resources)
    }
}
