use academy_core::model::{
    Course, CourseId, CourseOutline, CourseResource, Lesson, LessonId, Module, ModuleId,
    ModuleOutline, ProgressId, ProgressRecord, ResourceId, User, UserId, WatchUpdate,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Accounts, looked up by the HTTP layer once a caller is authenticated.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;
}

/// Courses, modules and lessons. Read-only from the progress side.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored (e.g. unknown course).
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored (e.g. unknown module).
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Fetch a course regardless of its active flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Active courses ordered by ID, paged by `skip`/`limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_active_courses(&self, skip: u32, limit: u32)
    -> Result<Vec<Course>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_active_courses(&self) -> Result<u64, StorageError>;

    /// The course with its modules and lessons, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn course_outline(&self, id: CourseId) -> Result<Option<CourseOutline>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Every lesson under every module of the course.
    ///
    /// Returns `Ok(None)` when the course does not exist, and `Ok(Some(vec![]))`
    /// for a course without lessons.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn lessons_for_course(&self, id: CourseId) -> Result<Option<Vec<Lesson>>, StorageError>;
}

/// Per-(user, lesson) watch progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Records the user has for any of `lesson_ids`. Missing lessons are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn progress_for_lessons(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Create or merge a watch observation atomically and return the stored record.
    ///
    /// Implementations must apply the merge (`ProgressRecord::absorb`) as a
    /// single read-modify-write per key, so concurrent updates never lose
    /// the larger watched value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn record_watch(&self, update: &WatchUpdate) -> Result<ProgressRecord, StorageError>;
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the resource cannot be stored.
    async fn upsert_resource(&self, resource: &CourseResource) -> Result<(), StorageError>;

    /// Resources of a course ordered by `(order, id)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn resources_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    courses: HashMap<CourseId, Course>,
    modules: HashMap<ModuleId, Module>,
    lessons: HashMap<LessonId, Lesson>,
    progress: HashMap<(UserId, LessonId), ProgressRecord>,
    last_progress_id: u64,
    resources: HashMap<ResourceId, CourseResource>,
}

impl Tables {
    fn outline(&self, id: CourseId) -> Result<Option<CourseOutline>, StorageError> {
        let Some(course) = self.courses.get(&id) else {
            return Ok(None);
        };
        let modules = self
            .modules
            .values()
            .filter(|m| m.course_id() == id)
            .map(|m| ModuleOutline {
                module: m.clone(),
                lessons: self
                    .lessons
                    .values()
                    .filter(|l| l.module_id() == m.id())
                    .cloned()
                    .collect(),
            })
            .collect();
        CourseOutline::new(course.clone(), modules)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// A single mutex guards every table, which serialises watch merges.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        self.lock()?.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        self.lock()?.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&module.course_id()) {
            return Err(StorageError::Conflict);
        }
        guard.modules.insert(module.id(), module.clone());
        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.modules.contains_key(&lesson.module_id()) {
            return Err(StorageError::Conflict);
        }
        guard.lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }

    async fn list_active_courses(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Course>, StorageError> {
        let guard = self.lock()?;
        let mut active: Vec<Course> = guard
            .courses
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        active.sort_by_key(Course::id);
        Ok(active
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_active_courses(&self) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        Ok(guard.courses.values().filter(|c| c.is_active()).count() as u64)
    }

    async fn course_outline(&self, id: CourseId) -> Result<Option<CourseOutline>, StorageError> {
        self.lock()?.outline(id)
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lock()?.lessons.get(&id).cloned())
    }

    async fn lessons_for_course(&self, id: CourseId) -> Result<Option<Vec<Lesson>>, StorageError> {
        let outline = self.lock()?.outline(id)?;
        Ok(outline.map(|o| o.lessons().cloned().collect()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        Ok(self.lock()?.progress.get(&(user_id, lesson_id)).cloned())
    }

    async fn progress_for_lessons(
        &self,
        user_id: UserId,
        lesson_ids: &[LessonId],
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(lesson_ids
            .iter()
            .filter_map(|lesson_id| guard.progress.get(&(user_id, *lesson_id)).cloned())
            .collect())
    }

    async fn record_watch(&self, update: &WatchUpdate) -> Result<ProgressRecord, StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&update.user_id())
            || !guard.lessons.contains_key(&update.lesson_id())
        {
            return Err(StorageError::Conflict);
        }
        let tables = &mut *guard;
        let record = tables
            .progress
            .entry((update.user_id(), update.lesson_id()))
            .and_modify(|existing| existing.absorb(update))
            .or_insert_with(|| {
                tables.last_progress_id += 1;
                ProgressRecord::start(update).with_id(ProgressId::new(tables.last_progress_id))
            });
        Ok(record.clone())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryRepository {
    async fn upsert_resource(&self, resource: &CourseResource) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.courses.contains_key(&resource.course_id()) {
            return Err(StorageError::Conflict);
        }
        guard.resources.insert(resource.id(), resource.clone());
        Ok(())
    }

    async fn resources_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CourseResource>, StorageError> {
        let guard = self.lock()?;
        let mut found: Vec<CourseResource> = guard
            .resources
            .values()
            .filter(|r| r.course_id() == course_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.order(), r.id()));
        Ok(found)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub resources: Arc<dyn ResourceRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every repository slot to the same backend.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + CatalogRepository
            + ProgressRepository
            + ResourceRepository
            + Clone
            + 'static,
    {
        Self {
            users: Arc::new(repo.clone()),
            catalog: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            resources: Arc::new(repo),
        }
    }
}
