use std::collections::HashMap;

use crate::model::{CourseProgressSummary, Lesson, LessonId, ProgressRecord, cap_watched};

//
// ─── COMPLETION RULE ───────────────────────────────────────────────────────────
//

/// Share of a lesson that must be watched before it counts as completed in a
/// course summary, as the fraction `NUMERATOR / DENOMINATOR` (90%).
pub const COMPLETION_NUMERATOR: u64 = 9;
pub const COMPLETION_DENOMINATOR: u64 = 10;

/// Seconds of a lesson that count toward the course total.
#[must_use]
pub fn effective_watched(lesson: &Lesson, record: &ProgressRecord) -> u32 {
    cap_watched(record.watched_duration(), lesson.known_duration())
}

/// Whether `watched` seconds reach the completion threshold of `lesson`.
///
/// Lessons with unknown or zero duration never reach it, regardless of any
/// explicit completion flag on the stored record.
#[must_use]
pub fn reaches_threshold(lesson: &Lesson, watched: u32) -> bool {
    match lesson.known_duration() {
        Some(duration) => {
            u64::from(watched) * COMPLETION_DENOMINATOR
                >= u64::from(duration) * COMPLETION_NUMERATOR
        }
        None => false,
    }
}

/// Course completion percentage in `[0, 100]`, rounded to 2 decimals with
/// exact ties going to the even cent.
///
/// # Examples
///
/// ```
/// # use academy_core::progress::completion_percentage;
/// assert_eq!(completion_percentage(231, 756), 30.56);
/// assert_eq!(completion_percentage(10, 0), 0.0);
/// assert_eq!(completion_percentage(900, 600), 100.0);
/// assert_eq!(completion_percentage(1, 800), 0.12);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percentage(watched: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = (watched as f64 / total as f64 * 100.0).min(100.0);
    (raw * 100.0).round_ties_even() / 100.0
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Summarise one user's progress over the full lesson set of a course.
///
/// `records` holds whatever progress the user has; lessons without a record
/// contribute their duration to the total and nothing to the watched sum.
#[must_use]
pub fn summarize<'a, I>(
    lessons: I,
    records: &HashMap<LessonId, ProgressRecord>,
) -> CourseProgressSummary
where
    I: IntoIterator<Item = &'a Lesson>,
{
    let mut summary = CourseProgressSummary::empty();

    for lesson in lessons {
        summary.total_lessons += 1;
        summary.total_duration += u64::from(lesson.video_duration().unwrap_or(0));

        let Some(record) = records.get(&lesson.id()) else {
            continue;
        };
        let effective = effective_watched(lesson, record);
        summary.watched_duration += u64::from(effective);
        if reaches_threshold(lesson, effective) {
            summary.completed_lessons += 1;
        }
    }

    summary.progress_percentage =
        completion_percentage(summary.watched_duration, summary.total_duration);
    summary
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleId, ProgressId, UserId, WatchUpdate, parse_url};
    use crate::time::fixed_now;

    fn lesson(id: u64, duration: Option<u32>) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            ModuleId::new(1),
            format!("Lesson {id}"),
            None,
            parse_url("https://example.com/video").unwrap(),
            duration,
            i32::try_from(id).unwrap(),
        )
        .unwrap()
    }

    fn watched(lesson: &Lesson, seconds: u32, completed: bool) -> (LessonId, ProgressRecord) {
        let update =
            WatchUpdate::for_lesson(UserId::new(1), lesson, seconds, completed, fixed_now());
        (lesson.id(), ProgressRecord::start(&update))
    }

    #[test]
    fn demo_course_reports_two_completed_lessons() {
        let lessons = vec![
            lesson(1, Some(212)),
            lesson(2, Some(19)),
            lesson(3, Some(273)),
            lesson(4, Some(252)),
        ];
        let records: HashMap<_, _> = [
            watched(&lessons[0], 212, false),
            watched(&lessons[1], 19, false),
            watched(&lessons[2], 0, false),
            watched(&lessons[3], 0, false),
        ]
        .into_iter()
        .collect();

        let summary = summarize(&lessons, &records);
        assert_eq!(summary.total_lessons, 4);
        assert_eq!(summary.total_duration, 756);
        assert_eq!(summary.watched_duration, 231);
        assert_eq!(summary.completed_lessons, 2);
        assert_eq!(summary.progress_percentage, 30.56);
    }

    #[test]
    fn empty_course_has_zero_percentage() {
        let summary = summarize(&Vec::<Lesson>::new(), &HashMap::new());
        assert_eq!(summary, CourseProgressSummary::empty());
    }

    #[test]
    fn unknown_durations_give_zero_percentage_without_dividing() {
        let lessons = vec![lesson(1, None), lesson(2, Some(0))];
        let records: HashMap<_, _> = [watched(&lessons[0], 50, true)].into_iter().collect();

        let summary = summarize(&lessons, &records);
        assert_eq!(summary.total_lessons, 2);
        assert_eq!(summary.total_duration, 0);
        assert_eq!(summary.watched_duration, 50);
        assert_eq!(summary.progress_percentage, 0.0);
    }

    #[test]
    fn explicit_completion_flag_is_not_counted() {
        let lessons = vec![lesson(1, Some(100))];
        let records: HashMap<_, _> = [watched(&lessons[0], 10, true)].into_iter().collect();

        let summary = summarize(&lessons, &records);
        assert_eq!(summary.completed_lessons, 0);
    }

    #[test]
    fn threshold_is_ninety_percent_inclusive() {
        let l = lesson(1, Some(100));
        assert!(reaches_threshold(&l, 90));
        assert!(!reaches_threshold(&l, 89));

        let odd = lesson(2, Some(19));
        assert!(reaches_threshold(&odd, 18));
        assert!(!reaches_threshold(&odd, 17));
    }

    #[test]
    fn stale_records_are_capped_before_summing() {
        let l = lesson(1, Some(100));
        let stored = ProgressRecord::from_persisted(
            ProgressId::new(1),
            UserId::new(1),
            l.id(),
            400,
            false,
            fixed_now(),
        );
        let records: HashMap<_, _> = [(l.id(), stored)].into_iter().collect();

        let summary = summarize(std::slice::from_ref(&l), &records);
        assert_eq!(summary.watched_duration, 100);
        assert_eq!(summary.progress_percentage, 100.0);
    }

    #[test]
    fn half_cent_percentages_round_to_even() {
        assert_eq!(completion_percentage(1, 800), 0.12);
        assert_eq!(completion_percentage(1, 32), 3.12);
        assert_eq!(completion_percentage(1, 3), 33.33);
    }

    #[test]
    fn percentage_never_exceeds_one_hundred() {
        for (w, t) in [(0, 1), (1, 3), (2, 3), (5, 5), (10, 3)] {
            let p = completion_percentage(w, t);
            assert!((0.0..=100.0).contains(&p), "{w}/{t} -> {p}");
        }
    }
}
