use std::sync::Arc;

use academy_core::model::{Course, CourseId, CourseOutline};
use storage::repository::CatalogRepository;

use crate::error::CatalogError;

/// Largest page `list_courses` will return.
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// One page of active courses plus the total number of active courses.
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub total: u64,
}

/// Read side of the course catalog. Inactive courses are hidden.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// List active courses ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPaging` if `skip` is negative or `limit`
    /// is outside `1..=100`.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_courses(&self, skip: i64, limit: i64) -> Result<CoursePage, CatalogError> {
        let skip = u32::try_from(skip)
            .map_err(|_| CatalogError::InvalidPaging("skip must be a non-negative integer"))?;
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(CatalogError::InvalidPaging("limit must be between 1 and 100"));
        }
        let limit = u32::try_from(limit)
            .map_err(|_| CatalogError::InvalidPaging("limit must be between 1 and 100"))?;

        let courses = self.catalog.list_active_courses(skip, limit).await?;
        let total = self.catalog.count_active_courses().await?;
        Ok(CoursePage { courses, total })
    }

    /// Every active course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn active_courses(&self) -> Result<Vec<Course>, CatalogError> {
        Ok(self.catalog.list_active_courses(0, u32::MAX).await?)
    }

    /// An active course with its ordered modules and lessons.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CourseNotFound` if the course is missing or inactive.
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_course(&self, course_id: CourseId) -> Result<CourseOutline, CatalogError> {
        self.catalog
            .course_outline(course_id)
            .await?
            .filter(|outline| outline.course().is_active())
            .ok_or(CatalogError::CourseNotFound(course_id))
    }

    /// Fails unless the course exists and is active.
    pub(crate) async fn require_active(&self, course_id: CourseId) -> Result<Course, CatalogError> {
        self.catalog
            .get_course(course_id)
            .await?
            .filter(Course::is_active)
            .ok_or(CatalogError::CourseNotFound(course_id))
    }
}
