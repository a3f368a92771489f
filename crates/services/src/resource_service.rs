use std::sync::Arc;

use academy_core::model::{CourseId, CourseResource};
use storage::repository::ResourceRepository;

use crate::catalog_service::CatalogService;
use crate::error::CatalogError;

/// Downloadable material attached to courses.
#[derive(Clone)]
pub struct ResourceService {
    catalog: CatalogService,
    resources: Arc<dyn ResourceRepository>,
}

impl ResourceService {
    #[must_use]
    pub fn new(catalog: CatalogService, resources: Arc<dyn ResourceRepository>) -> Self {
        Self { catalog, resources }
    }

    /// Resources of an active course, ordered for display.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` if the course is missing or inactive.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn resources_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, CatalogError> {
        self.catalog.require_active(course_id).await?;
        Ok(self.resources.resources_for_course(course_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::model::{Course, Price, ResourceId, ResourceType};
    use academy_core::time::fixed_now;
    use storage::repository::{CatalogRepository, InMemoryRepository};

    async fn course(repo: &InMemoryRepository, active: bool) {
        let course = Course::new(
            CourseId::new(1),
            "Course",
            None,
            None,
            Price::free(),
            None,
            active,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_course(&course).await.unwrap();
    }

    fn service(repo: &InMemoryRepository) -> ResourceService {
        ResourceService::new(
            CatalogService::new(Arc::new(repo.clone())),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn resources_follow_display_order() {
        let repo = InMemoryRepository::new();
        course(&repo, true).await;
        for (id, order, title) in [(1, 2, "Locations Map"), (2, 1, "Settings Guide")] {
            let resource = CourseResource::new(
                ResourceId::new(id),
                CourseId::new(1),
                title,
                None,
                ResourceType::Link,
                None,
                None,
                order,
                fixed_now(),
            )
            .unwrap();
            repo.upsert_resource(&resource).await.unwrap();
        }

        let found = service(&repo)
            .resources_for_course(CourseId::new(1))
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(CourseResource::title).collect();
        assert_eq!(titles, vec!["Settings Guide", "Locations Map"]);
    }

    #[tokio::test]
    async fn inactive_course_hides_resources() {
        let repo = InMemoryRepository::new();
        course(&repo, false).await;
        let err = service(&repo)
            .resources_for_course(CourseId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CourseNotFound(_)));
    }
}
