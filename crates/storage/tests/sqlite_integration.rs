use academy_core::model::{
    AuthProvider, Course, CourseId, CourseResource, Lesson, LessonId, Module, ModuleId, Price,
    ResourceId, ResourceType, User, UserId, WatchUpdate, parse_url,
};
use academy_core::time::fixed_now;
use chrono::Duration;
use storage::repository::{
    CatalogRepository, ProgressRepository, ResourceRepository, StorageError, UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn lesson(id: u64, module: u64, duration: Option<u32>, order: i32) -> Lesson {
    Lesson::new(
        LessonId::new(id),
        ModuleId::new(module),
        format!("Lesson {id}"),
        None,
        parse_url("https://www.youtube.com/watch?v=abc").unwrap(),
        duration,
        order,
    )
    .unwrap()
}

async fn seed_course(repo: &SqliteRepository) {
    let user = User::new(
        UserId::new(1),
        "test@example.com",
        "testuser",
        Some("Test User".into()),
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
        Price::new(0.0, "USD").unwrap(),
        None,
        true,
        fixed_now(),
    )
    .unwrap();
    repo.upsert_course(&course).await.unwrap();
    let module = Module::new(ModuleId::new(1), CourseId::new(1), "Game Basics", None, 1).unwrap();
    repo.upsert_module(&module).await.unwrap();

    for (id, duration) in [(1, 212), (2, 19), (3, 273), (4, 252)] {
        let order = i32::try_from(id).unwrap();
        repo.upsert_lesson(&lesson(id, 1, Some(duration), order))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn sqlite_roundtrips_users_and_catalog() {
    let repo = connect("memdb_catalog").await;
    seed_course(&repo).await;

    let user = repo.get_user(UserId::new(1)).await.unwrap().unwrap();
    assert_eq!(user.username(), "testuser");
    assert_eq!(user.full_name(), Some("Test User"));
    assert!(repo.get_user(UserId::new(9)).await.unwrap().is_none());

    let course = repo.get_course(CourseId::new(1)).await.unwrap().unwrap();
    assert_eq!(course.price().currency(), "USD");
    assert!(course.is_active());

    let outline = repo.course_outline(CourseId::new(1)).await.unwrap().unwrap();
    assert_eq!(outline.modules().len(), 1);
    let durations: Vec<_> = outline.lessons().map(Lesson::video_duration).collect();
    assert_eq!(durations, vec![Some(212), Some(19), Some(273), Some(252)]);

    assert!(repo.lessons_for_course(CourseId::new(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_lists_only_active_courses_with_paging() {
    let repo = connect("memdb_paging").await;
    for (id, active) in [(1, true), (2, false), (3, true), (4, true)] {
        let course = Course::new(
            CourseId::new(id),
            format!("Course {id}"),
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

    assert_eq!(repo.count_active_courses().await.unwrap(), 3);
    let page = repo.list_active_courses(1, 1).await.unwrap();
    let ids: Vec<_> = page.iter().map(Course::id).collect();
    assert_eq!(ids, vec![CourseId::new(3)]);
    assert!(repo.list_active_courses(10, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_watch_upsert_keeps_maximum_and_caps() {
    let repo = connect("memdb_progress").await;
    seed_course(&repo).await;
    let lesson = repo.get_lesson(LessonId::new(1)).await.unwrap().unwrap();
    let user = UserId::new(1);

    let first = repo
        .record_watch(&WatchUpdate::for_lesson(user, &lesson, 250, false, fixed_now()))
        .await
        .unwrap();
    assert_eq!(first.watched_duration(), 212);

    let later = fixed_now() + Duration::minutes(3);
    let rewound = repo
        .record_watch(&WatchUpdate::for_lesson(user, &lesson, 40, true, later))
        .await
        .unwrap();
    assert_eq!(rewound.watched_duration(), 212);
    assert!(rewound.is_completed());
    assert_eq!(rewound.last_watched_at(), later);
    assert!(first.id().is_some());
    assert_eq!(rewound.id(), first.id());

    let again = repo
        .record_watch(&WatchUpdate::for_lesson(user, &lesson, 10, false, later))
        .await
        .unwrap();
    assert!(again.is_completed());

    let stored = repo.get_progress(user, lesson.id()).await.unwrap().unwrap();
    assert_eq!(stored, again);
}

#[tokio::test]
async fn sqlite_watch_recaps_when_lesson_shrinks() {
    let repo = connect("memdb_recap").await;
    seed_course(&repo).await;
    let user = UserId::new(1);
    let original = repo.get_lesson(LessonId::new(3)).await.unwrap().unwrap();
    repo.record_watch(&WatchUpdate::for_lesson(user, &original, 270, false, fixed_now()))
        .await
        .unwrap();

    let shorter = lesson(3, 1, Some(200), 3);
    repo.upsert_lesson(&shorter).await.unwrap();
    let merged = repo
        .record_watch(&WatchUpdate::for_lesson(user, &shorter, 5, false, fixed_now()))
        .await
        .unwrap();
    assert_eq!(merged.watched_duration(), 200);
}

#[tokio::test]
async fn sqlite_progress_for_lessons_skips_untouched() {
    let repo = connect("memdb_batch").await;
    seed_course(&repo).await;
    let user = UserId::new(1);
    let lesson = repo.get_lesson(LessonId::new(2)).await.unwrap().unwrap();
    repo.record_watch(&WatchUpdate::for_lesson(user, &lesson, 19, false, fixed_now()))
        .await
        .unwrap();

    let ids = [LessonId::new(1), LessonId::new(2), LessonId::new(3)];
    let records = repo.progress_for_lessons(user, &ids).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lesson_id(), LessonId::new(2));
    assert!(repo.progress_for_lessons(user, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_treats_ids_past_integer_range_as_absent() {
    let repo = connect("memdb_huge_ids").await;
    seed_course(&repo).await;
    let user = UserId::new(1);
    let huge = u64::MAX;

    assert!(repo.get_user(UserId::new(huge)).await.unwrap().is_none());
    assert!(repo.get_course(CourseId::new(huge)).await.unwrap().is_none());
    assert!(repo.lessons_for_course(CourseId::new(huge)).await.unwrap().is_none());
    assert!(repo.get_lesson(LessonId::new(huge)).await.unwrap().is_none());
    assert!(repo.get_progress(user, LessonId::new(huge)).await.unwrap().is_none());
    assert!(
        repo.resources_for_course(CourseId::new(huge))
            .await
            .unwrap()
            .is_empty()
    );

    let lesson = repo.get_lesson(LessonId::new(2)).await.unwrap().unwrap();
    repo.record_watch(&WatchUpdate::for_lesson(user, &lesson, 19, false, fixed_now()))
        .await
        .unwrap();
    let records = repo
        .progress_for_lessons(user, &[LessonId::new(huge), LessonId::new(2)])
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_watch_upserts_keep_the_maximum() {
    let repo = connect("memdb_concurrent").await;
    seed_course(&repo).await;
    let user = UserId::new(1);
    let lesson = repo.get_lesson(LessonId::new(3)).await.unwrap().unwrap();

    let mut handles = Vec::new();
    for seconds in [30, 200, 90, 150, 10, 120, 260, 5] {
        let repo = repo.clone();
        let update = WatchUpdate::for_lesson(user, &lesson, seconds, false, fixed_now());
        handles.push(tokio::spawn(async move { repo.record_watch(&update).await }));
    }
    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        assert!(record.watched_duration() <= 273);
    }

    let stored = repo.get_progress(user, lesson.id()).await.unwrap().unwrap();
    assert_eq!(stored.watched_duration(), 260);
    assert!(!stored.is_completed());
}

#[tokio::test]
async fn sqlite_rejects_progress_for_unknown_user() {
    let repo = connect("memdb_fk").await;
    seed_course(&repo).await;
    let lesson = repo.get_lesson(LessonId::new(1)).await.unwrap().unwrap();

    let err = repo
        .record_watch(&WatchUpdate::for_lesson(
            UserId::new(77),
            &lesson,
            5,
            false,
            fixed_now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_resources_are_ordered_by_position() {
    let repo = connect("memdb_resources").await;
    seed_course(&repo).await;

    for (id, order, kind) in [
        (1, 3, ResourceType::Template),
        (2, 1, ResourceType::Pdf),
        (3, 2, ResourceType::Link),
    ] {
        let resource = CourseResource::new(
            ResourceId::new(id),
            CourseId::new(1),
            format!("Resource {id}"),
            None,
            kind,
            Some(parse_url("https://example.com/file").unwrap()),
            None,
            order,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_resource(&resource).await.unwrap();
    }

    let found = repo.resources_for_course(CourseId::new(1)).await.unwrap();
    let kinds: Vec<_> = found.iter().map(CourseResource::resource_type).collect();
    assert_eq!(
        kinds,
        vec![ResourceType::Pdf, ResourceType::Link, ResourceType::Template]
    );
    assert!(repo.resources_for_course(CourseId::new(2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate").await;
    repo.migrate().await.expect("second migrate");
}
