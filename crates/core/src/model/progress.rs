use chrono::{DateTime, Utc};

use crate::model::course::Lesson;
use crate::model::ids::{LessonId, ProgressId, UserId};

//
// ─── WATCH UPDATE ──────────────────────────────────────────────────────────────
//

/// Clamp a client-reported watch position to something storable.
///
/// Negative values become zero; values beyond `u32` saturate.
#[must_use]
pub fn clamp_reported_seconds(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Cap watched seconds to a lesson's known, positive duration.
#[must_use]
pub fn cap_watched(watched: u32, cap: Option<u32>) -> u32 {
    match cap {
        Some(limit) if limit > 0 => watched.min(limit),
        _ => watched,
    }
}

/// A capped watch observation, ready to be merged into stored progress.
///
/// Build it with [`WatchUpdate::for_lesson`] so the cap always reflects the
/// lesson's authoritative duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchUpdate {
    user_id: UserId,
    lesson_id: LessonId,
    watched: u32,
    cap: Option<u32>,
    completed: bool,
    at: DateTime<Utc>,
}

impl WatchUpdate {
    #[must_use]
    pub fn for_lesson(
        user_id: UserId,
        lesson: &Lesson,
        observed: u32,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Self {
        let cap = lesson.known_duration();
        Self {
            user_id,
            lesson_id: lesson.id(),
            watched: cap_watched(observed, cap),
            cap,
            completed,
            at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    /// Observed seconds after capping.
    #[must_use]
    pub fn watched(&self) -> u32 {
        self.watched
    }

    #[must_use]
    pub fn cap(&self) -> Option<u32> {
        self.cap
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Lifecycle of a user's progress on one lesson. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

/// Per-(user, lesson) watch state.
///
/// `id` is assigned by the store; records that were never persisted have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    id: Option<ProgressId>,
    user_id: UserId,
    lesson_id: LessonId,
    watched_duration: u32,
    is_completed: bool,
    last_watched_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// The zero record returned for lessons the user has never opened,
    /// stamped with the time of the lookup.
    #[must_use]
    pub fn not_started(user_id: UserId, lesson_id: LessonId, at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id,
            lesson_id,
            watched_duration: 0,
            is_completed: false,
            last_watched_at: at,
        }
    }

    /// First record for a (user, lesson) pair.
    #[must_use]
    pub fn start(update: &WatchUpdate) -> Self {
        Self {
            id: None,
            user_id: update.user_id,
            lesson_id: update.lesson_id,
            watched_duration: update.watched,
            is_completed: update.completed,
            last_watched_at: update.at,
        }
    }

    /// Rehydrate a stored record.
    #[must_use]
    pub fn from_persisted(
        id: ProgressId,
        user_id: UserId,
        lesson_id: LessonId,
        watched_duration: u32,
        is_completed: bool,
        last_watched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            user_id,
            lesson_id,
            watched_duration,
            is_completed,
            last_watched_at,
        }
    }

    /// Attach the row id a store assigned on first insert.
    #[must_use]
    pub fn with_id(mut self, id: ProgressId) -> Self {
        self.id = Some(id);
        self
    }

    /// Merge a later observation.
    ///
    /// Watched time keeps its maximum (seeking backwards never loses
    /// progress) and is re-capped to the lesson duration; completion is
    /// sticky.
    pub fn absorb(&mut self, update: &WatchUpdate) {
        debug_assert_eq!(self.user_id, update.user_id);
        debug_assert_eq!(self.lesson_id, update.lesson_id);

        let merged = self.watched_duration.max(update.watched);
        self.watched_duration = cap_watched(merged, update.cap);
        self.is_completed = self.is_completed || update.completed;
        self.last_watched_at = update.at;
    }

    #[must_use]
    pub fn id(&self) -> Option<ProgressId> {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn watched_duration(&self) -> u32 {
        self.watched_duration
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn last_watched_at(&self) -> DateTime<Utc> {
        self.last_watched_at
    }

    #[must_use]
    pub fn state(&self) -> ProgressState {
        if self.is_completed {
            ProgressState::Completed
        } else if self.id.is_some() || self.watched_duration > 0 {
            ProgressState::InProgress
        } else {
            ProgressState::NotStarted
        }
    }
}

//
// ─── COURSE SUMMARY ────────────────────────────────────────────────────────────
//

/// Aggregate progress of one user across every lesson of a course.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CourseProgressSummary {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub total_duration: u64,
    pub watched_duration: u64,
    pub progress_percentage: f64,
}

impl CourseProgressSummary {
    /// All-zero summary, used for courses that do not exist.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::course::parse_url;
    use crate::model::ids::ModuleId;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn lesson(duration: Option<u32>) -> Lesson {
        Lesson::new(
            LessonId::new(1),
            ModuleId::new(1),
            "Intro",
            None,
            parse_url("https://example.com/v.mp4").unwrap(),
            duration,
            1,
        )
        .unwrap()
    }

    fn update(lesson: &Lesson, observed: u32, completed: bool) -> WatchUpdate {
        WatchUpdate::for_lesson(UserId::new(1), lesson, observed, completed, fixed_now())
    }

    #[test]
    fn reported_seconds_floor_at_zero() {
        assert_eq!(clamp_reported_seconds(-30), 0);
        assert_eq!(clamp_reported_seconds(45), 45);
        assert_eq!(clamp_reported_seconds(i64::MAX), u32::MAX);
    }

    #[test]
    fn first_watch_is_capped_to_duration() {
        let l = lesson(Some(212));
        let record = ProgressRecord::start(&update(&l, 250, false));
        assert_eq!(record.watched_duration(), 212);
        assert_eq!(record.state(), ProgressState::InProgress);
    }

    #[test]
    fn unknown_duration_is_not_capped() {
        let l = lesson(None);
        let record = ProgressRecord::start(&update(&l, 5_000, false));
        assert_eq!(record.watched_duration(), 5_000);

        let zero = lesson(Some(0));
        let record = ProgressRecord::start(&update(&zero, 40, false));
        assert_eq!(record.watched_duration(), 40);
    }

    #[test]
    fn rewinding_never_loses_progress() {
        let l = lesson(Some(212));
        let mut record = ProgressRecord::start(&update(&l, 100, false));
        record.absorb(&update(&l, 50, false));
        assert_eq!(record.watched_duration(), 100);
    }

    #[test]
    fn merge_recaps_when_duration_shrinks() {
        let long = lesson(Some(300));
        let mut record = ProgressRecord::start(&update(&long, 280, false));

        let short = lesson(Some(200));
        record.absorb(&update(&short, 10, false));
        assert_eq!(record.watched_duration(), 200);
    }

    #[test]
    fn completion_is_sticky() {
        let l = lesson(Some(60));
        let mut record = ProgressRecord::start(&update(&l, 10, true));
        assert_eq!(record.state(), ProgressState::Completed);

        record.absorb(&update(&l, 20, false));
        assert!(record.is_completed());
        assert_eq!(record.watched_duration(), 20);
    }

    #[test]
    fn merge_advances_timestamp() {
        let l = lesson(Some(60));
        let mut record = ProgressRecord::start(&update(&l, 10, false));
        let later = fixed_now() + Duration::minutes(5);
        record.absorb(&WatchUpdate::for_lesson(UserId::new(1), &l, 10, false, later));
        assert_eq!(record.last_watched_at(), later);
        assert_eq!(record.watched_duration(), 10);
    }

    #[test]
    fn not_started_record_is_zeroed() {
        let record = ProgressRecord::not_started(UserId::new(3), LessonId::new(4), fixed_now());
        assert_eq!(record.id(), None);
        assert_eq!(record.watched_duration(), 0);
        assert!(!record.is_completed());
        assert_eq!(record.last_watched_at(), fixed_now());
        assert_eq!(record.state(), ProgressState::NotStarted);
    }
}
