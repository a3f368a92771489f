use std::collections::HashMap;
use std::sync::Arc;

use academy_core::model::{
    CourseId, CourseProgressSummary, LessonId, ProgressRecord, UserId, WatchUpdate,
    clamp_reported_seconds,
};
use academy_core::progress::summarize;
use storage::repository::{CatalogRepository, ProgressRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::ProgressError;

/// Records watch positions and derives per-course progress.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            progress,
        }
    }

    /// Merge a client-reported watch position into the user's progress.
    ///
    /// Negative positions count as zero. The position is capped to the
    /// lesson's known duration, never lowers stored progress, and an explicit
    /// completion flag is sticky.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::LessonNotFound` if the lesson does not exist.
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn record_watch_update(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        observed_seconds: i64,
        completed: Option<bool>,
    ) -> Result<ProgressRecord, ProgressError> {
        let lesson = self
            .catalog
            .get_lesson(lesson_id)
            .await?
            .ok_or(ProgressError::LessonNotFound(lesson_id))?;

        let update = WatchUpdate::for_lesson(
            user_id,
            &lesson,
            clamp_reported_seconds(observed_seconds),
            completed.unwrap_or(false),
            self.clock.now(),
        );
        let record = self.progress.record_watch(&update).await?;

        debug!(
            user_id = %user_id,
            lesson_id = %lesson_id,
            observed = observed_seconds,
            watched = record.watched_duration(),
            completed = record.is_completed(),
            "watch update recorded"
        );
        Ok(record)
    }

    /// Stored progress, or a zeroed record when the user never watched it.
    ///
    /// The zeroed record is not persisted.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn get_lesson_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<ProgressRecord, ProgressError> {
        let stored = self.progress.get_progress(user_id, lesson_id).await?;
        Ok(stored.unwrap_or_else(|| {
            ProgressRecord::not_started(user_id, lesson_id, self.clock.now())
        }))
    }

    /// Aggregate progress over every lesson of a course.
    ///
    /// A course that does not exist yields an all-zero summary.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if repository access fails.
    pub async fn course_progress_summary(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<CourseProgressSummary, ProgressError> {
        let Some(lessons) = self.catalog.lessons_for_course(course_id).await? else {
            debug!(course_id = %course_id, "summary requested for unknown course");
            return Ok(CourseProgressSummary::empty());
        };

        let ids: Vec<LessonId> = lessons.iter().map(|l| l.id()).collect();
        let records: HashMap<LessonId, ProgressRecord> = self
            .progress
            .progress_for_lessons(user_id, &ids)
            .await?
            .into_iter()
            .map(|r| (r.lesson_id(), r))
            .collect();

        let summary = summarize(&lessons, &records);
        info!(
            user_id = %user_id,
            course_id = %course_id,
            completed = summary.completed_lessons,
            total = summary.total_lessons,
            percentage = summary.progress_percentage,
            "course progress summarised"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::model::{
        AuthProvider, Course, Lesson, Module, ModuleId, Price, ProgressState, User, parse_url,
    };
    use academy_core::time::{fixed_clock, fixed_now};
    use chrono::Duration;
    use storage::repository::{InMemoryRepository, UserRepository};

    async fn demo_repo(durations: &[Option<u32>]) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let user = User::new(
            UserId::new(1),
            "test@example.com",
            "testuser",
            None,
            AuthProvider::Email,
            true,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_user(&user).await.unwrap();

        let course = Course::new(
            CourseId::new(1),
            "Fortnite Test Course",
            None,
            None,
            Price::free(),
            None,
            true,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_course(&course).await.unwrap();
        let module =
            Module::new(ModuleId::new(1), CourseId::new(1), "Game Basics", None, 1).unwrap();
        repo.upsert_module(&module).await.unwrap();

        for (idx, duration) in durations.iter().enumerate() {
            let id = u64::try_from(idx + 1).unwrap();
            let lesson = Lesson::new(
                LessonId::new(id),
                ModuleId::new(1),
                format!("Lesson {id}"),
                None,
                parse_url("https://www.youtube.com/watch?v=abc").unwrap(),
                *duration,
                i32::try_from(id).unwrap(),
            )
            .unwrap();
            repo.upsert_lesson(&lesson).await.unwrap();
        }
        repo
    }

    fn service(repo: &InMemoryRepository, clock: Clock) -> ProgressService {
        ProgressService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    const USER: UserId = UserId::new(1);

    #[tokio::test]
    async fn first_update_is_capped_to_duration() {
        let repo = demo_repo(&[Some(212)]).await;
        let svc = service(&repo, fixed_clock());

        let record = svc
            .record_watch_update(USER, LessonId::new(1), 250, None)
            .await
            .unwrap();
        assert_eq!(record.watched_duration(), 212);
        assert!(!record.is_completed());
        assert_eq!(record.last_watched_at(), fixed_now());
    }

    #[tokio::test]
    async fn rewinding_keeps_the_furthest_position() {
        let repo = demo_repo(&[Some(212)]).await;
        let svc = service(&repo, fixed_clock());
        svc.record_watch_update(USER, LessonId::new(1), 100, None)
            .await
            .unwrap();

        let later = service(&repo, fixed_clock().advanced_by(Duration::minutes(2)));
        let record = later
            .record_watch_update(USER, LessonId::new(1), 50, None)
            .await
            .unwrap();
        assert_eq!(record.watched_duration(), 100);
        assert_eq!(record.last_watched_at(), fixed_now() + Duration::minutes(2));
    }

    #[tokio::test]
    async fn completion_flag_never_reverts() {
        let repo = demo_repo(&[Some(60)]).await;
        let svc = service(&repo, fixed_clock());
        svc.record_watch_update(USER, LessonId::new(1), 10, Some(true))
            .await
            .unwrap();
        let record = svc
            .record_watch_update(USER, LessonId::new(1), 20, Some(false))
            .await
            .unwrap();
        assert!(record.is_completed());
        assert_eq!(record.state(), ProgressState::Completed);
    }

    #[tokio::test]
    async fn negative_positions_are_floored() {
        let repo = demo_repo(&[Some(60)]).await;
        let svc = service(&repo, fixed_clock());
        let record = svc
            .record_watch_update(USER, LessonId::new(1), -15, None)
            .await
            .unwrap();
        assert_eq!(record.watched_duration(), 0);
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let repo = demo_repo(&[Some(60)]).await;
        let svc = service(&repo, fixed_clock());
        let err = svc
            .record_watch_update(USER, LessonId::new(99), 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::LessonNotFound(id) if id == LessonId::new(99)));
    }

    #[tokio::test]
    async fn unwatched_lesson_reports_zero_without_persisting() {
        let repo = demo_repo(&[Some(60)]).await;
        let svc = service(&repo, fixed_clock());

        let record = svc.get_lesson_progress(USER, LessonId::new(1)).await.unwrap();
        assert_eq!(record.watched_duration(), 0);
        assert_eq!(record.id(), None);
        assert_eq!(record.last_watched_at(), fixed_now());
        assert_eq!(record.state(), ProgressState::NotStarted);

        assert!(
            repo.get_progress(USER, LessonId::new(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn demo_course_summary_matches_watched_lessons() {
        let repo = demo_repo(&[Some(212), Some(19), Some(273), Some(252)]).await;
        let svc = service(&repo, fixed_clock());
        for (lesson, seconds) in [(1, 212), (2, 19), (3, 0), (4, 0)] {
            svc.record_watch_update(USER, LessonId::new(lesson), seconds, None)
                .await
                .unwrap();
        }

        let summary = svc
            .course_progress_summary(USER, CourseId::new(1))
            .await
            .unwrap();
        assert_eq!(summary.total_lessons, 4);
        assert_eq!(summary.completed_lessons, 2);
        assert_eq!(summary.total_duration, 756);
        assert_eq!(summary.watched_duration, 231);
        assert_eq!(summary.progress_percentage, 30.56);
    }

    #[tokio::test]
    async fn unknown_durations_do_not_divide_by_zero() {
        let repo = demo_repo(&[None, None]).await;
        let svc = service(&repo, fixed_clock());
        svc.record_watch_update(USER, LessonId::new(1), 500, Some(true))
            .await
            .unwrap();

        let summary = svc
            .course_progress_summary(USER, CourseId::new(1))
            .await
            .unwrap();
        assert_eq!(summary.total_duration, 0);
        assert_eq!(summary.watched_duration, 500);
        assert_eq!(summary.completed_lessons, 0);
        assert_eq!(summary.progress_percentage, 0.0);
    }

    #[tokio::test]
    async fn missing_course_yields_empty_summary() {
        let repo = demo_repo(&[Some(60)]).await;
        let svc = service(&repo, fixed_clock());
        let summary = svc
            .course_progress_summary(USER, CourseId::new(404))
            .await
            .unwrap();
        assert_eq!(summary, CourseProgressSummary::empty());
    }
}
