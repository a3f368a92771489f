use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, LessonId, ModuleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("price must be a finite, non-negative amount")]
    InvalidPrice,

    #[error("currency must be a three-letter code")]
    InvalidCurrency,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("lesson {lesson} belongs to module {actual}, not {expected}")]
    ForeignLesson {
        lesson: LessonId,
        expected: ModuleId,
        actual: ModuleId,
    },

    #[error("module {module} belongs to course {actual}, not {expected}")]
    ForeignModule {
        module: ModuleId,
        expected: CourseId,
        actual: CourseId,
    },
}

fn validated_title(raw: impl Into<String>) -> Result<String, CourseError> {
    let raw = raw.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CourseError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

/// Parse an absolute URL.
///
/// # Errors
///
/// Returns `CourseError::InvalidUrl` if the value is not an absolute URL.
pub fn parse_url(raw: &str) -> Result<Url, CourseError> {
    Url::parse(raw.trim()).map_err(|e| CourseError::InvalidUrl(format!("{raw}: {e}")))
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Listing price of a course. Stored and served, never charged.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    amount: f64,
    currency: String,
}

impl Price {
    pub const DEFAULT_CURRENCY: &'static str = "RUB";

    /// # Errors
    ///
    /// Returns `CourseError::InvalidPrice` for negative or non-finite amounts
    /// and `CourseError::InvalidCurrency` for anything but a 3-letter code.
    pub fn new(amount: f64, currency: impl Into<String>) -> Result<Self, CourseError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CourseError::InvalidPrice);
        }
        let currency = currency.into().trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CourseError::InvalidCurrency);
        }
        Ok(Self { amount, currency })
    }

    #[must_use]
    pub fn free() -> Self {
        Self {
            amount: 0.0,
            currency: Self::DEFAULT_CURRENCY.to_owned(),
        }
    }

    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// A purchasable (currently free) course in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    short_description: Option<String>,
    price: Price,
    image_url: Option<Url>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Build a course, trimming the title.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        short_description: Option<String>,
        price: Price,
        image_url: Option<Url>,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            id,
            title: validated_title(title)?,
            description,
            short_description,
            price,
            image_url,
            is_active,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    #[must_use]
    pub fn price(&self) -> &Price {
        &self.price
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A chapter of a course grouping lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    course_id: CourseId,
    title: String,
    description: Option<String>,
    order: i32,
}

impl Module {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        course_id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        order: i32,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            id,
            course_id,
            title: validated_title(title)?,
            description,
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A single video inside a module.
///
/// `video_duration` is the authoritative length in seconds. `None` means the
/// length is unknown, in which case watch time is never capped and the lesson
/// cannot reach the completion threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    module_id: ModuleId,
    title: String,
    description: Option<String>,
    video_url: Url,
    video_duration: Option<u32>,
    order: i32,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        module_id: ModuleId,
        title: impl Into<String>,
        description: Option<String>,
        video_url: Url,
        video_duration: Option<u32>,
        order: i32,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            id,
            module_id,
            title: validated_title(title)?,
            description,
            video_url,
            video_duration,
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn video_url(&self) -> &Url {
        &self.video_url
    }

    #[must_use]
    pub fn video_duration(&self) -> Option<u32> {
        self.video_duration
    }

    /// Duration usable as a cap: known and strictly positive.
    #[must_use]
    pub fn known_duration(&self) -> Option<u32> {
        self.video_duration.filter(|d| *d > 0)
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }
}

//
// ─── OUTLINE ───────────────────────────────────────────────────────────────────
//

/// A module with its lessons, ordered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutline {
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

/// A course with every module and lesson beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOutline {
    course: Course,
    modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    /// Assemble an outline, sorting modules and lessons by `(order, id)`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::ForeignModule` or `CourseError::ForeignLesson`
    /// if a child does not point at its parent.
    pub fn new(course: Course, mut modules: Vec<ModuleOutline>) -> Result<Self, CourseError> {
        for entry in &mut modules {
            if entry.module.course_id() != course.id() {
                return Err(CourseError::ForeignModule {
                    module: entry.module.id(),
                    expected: course.id(),
                    actual: entry.module.course_id(),
                });
            }
            if let Some(stray) = entry
                .lessons
                .iter()
                .find(|l| l.module_id() != entry.module.id())
            {
                return Err(CourseError::ForeignLesson {
                    lesson: stray.id(),
                    expected: entry.module.id(),
                    actual: stray.module_id(),
                });
            }
            entry.lessons.sort_by_key(|l| (l.order(), l.id()));
        }
        modules.sort_by_key(|m| (m.module.order(), m.module.id()));
        Ok(Self { course, modules })
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleOutline] {
        &self.modules
    }

    /// Every lesson under the course, in display order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn video() -> Url {
        parse_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap()
    }

    fn course(id: u64) -> Course {
        Course::new(
            CourseId::new(id),
            "Basics",
            None,
            None,
            Price::free(),
            None,
            true,
            fixed_now(),
        )
        .unwrap()
    }

    fn lesson(id: u64, module: u64, order: i32) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            ModuleId::new(module),
            format!("Lesson {id}"),
            None,
            video(),
            Some(60),
            order,
        )
        .unwrap()
    }

    #[test]
    fn blank_titles_are_rejected() {
        let err = Module::new(ModuleId::new(1), CourseId::new(1), "  ", None, 0).unwrap_err();
        assert_eq!(err, CourseError::EmptyTitle);
    }

    #[test]
    fn price_normalises_currency() {
        let price = Price::new(9.5, "usd").unwrap();
        assert_eq!(price.currency(), "USD");
        assert!(Price::new(-1.0, "USD").is_err());
        assert!(Price::new(1.0, "dollars").is_err());
    }

    #[test]
    fn zero_duration_is_not_a_usable_cap() {
        let l = Lesson::new(
            LessonId::new(1),
            ModuleId::new(1),
            "Intro",
            None,
            video(),
            Some(0),
            1,
        )
        .unwrap();
        assert_eq!(l.video_duration(), Some(0));
        assert_eq!(l.known_duration(), None);
    }

    #[test]
    fn outline_orders_modules_and_lessons() {
        let m1 = Module::new(ModuleId::new(1), CourseId::new(1), "Second", None, 2).unwrap();
        let m2 = Module::new(ModuleId::new(2), CourseId::new(1), "First", None, 1).unwrap();
        let outline = CourseOutline::new(
            course(1),
            vec![
                ModuleOutline {
                    module: m1,
                    lessons: vec![lesson(11, 1, 2), lesson(10, 1, 1)],
                },
                ModuleOutline {
                    module: m2,
                    lessons: vec![lesson(20, 2, 1)],
                },
            ],
        )
        .unwrap();

        let ids: Vec<u64> = outline.lessons().map(|l| l.id().value()).collect();
        assert_eq!(ids, vec![20, 10, 11]);
        assert_eq!(outline.modules()[0].module.title(), "First");
    }

    #[test]
    fn outline_rejects_lessons_from_other_modules() {
        let m1 = Module::new(ModuleId::new(1), CourseId::new(1), "Only", None, 1).unwrap();
        let err = CourseOutline::new(
            course(1),
            vec![ModuleOutline {
                module: m1,
                lessons: vec![lesson(10, 9, 1)],
            }],
        )
        .unwrap_err();
        assert!(matches!(err, CourseError::ForeignLesson { .. }));
    }
}
