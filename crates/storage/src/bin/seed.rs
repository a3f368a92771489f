use std::fmt;

use academy_core::model::{
    AuthProvider, Course, CourseId, CourseResource, Lesson, LessonId, Module, ModuleId, Price,
    ResourceId, ResourceType, User, UserId, parse_url,
};
use chrono::{DateTime, Utc};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    email: String,
    username: String,
    course_id: CourseId,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidCourseId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ACADEMY_DB_URL")
            .unwrap_or_else(|_| "sqlite://academy.sqlite3".into());
        let mut user_id = std::env::var("ACADEMY_SEED_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut email =
            std::env::var("ACADEMY_SEED_EMAIL").unwrap_or_else(|_| "test@example.com".into());
        let mut username =
            std::env::var("ACADEMY_SEED_USERNAME").unwrap_or_else(|_| "testuser".into());
        let mut course_id = CourseId::new(1);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user-id" => {
                    let value = require_value(&mut args, "--user-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--email" => {
                    email = require_value(&mut args, "--email")?;
                }
                "--username" => {
                    username = require_value(&mut args, "--username")?;
                }
                "--course-id" => {
                    let value = require_value(&mut args, "--course-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                    course_id = CourseId::new(parsed);
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            email,
            username,
            course_id,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://academy.sqlite3)");
    eprintln!("  --user-id <id>            Test user id (default: 1)");
    eprintln!("  --email <email>           Test user email (default: test@example.com)");
    eprintln!("  --username <name>         Test user name (default: testuser)");
    eprintln!("  --course-id <id>          Demo course id (default: 1)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ACADEMY_DB_URL, ACADEMY_SEED_USER_ID, ACADEMY_SEED_EMAIL, ACADEMY_SEED_USERNAME");
}

/// Lesson titles, durations in seconds and video ids of the demo module.
const DEMO_LESSONS: [(&str, u32, &str); 4] = [
    ("Optimal Settings", 212, "Xnq1CnUAkB8"),
    ("Keybinds Setup", 19, "pmTs2MgOOd8"),
    ("Building Basics", 273, "bzC6FCs_gVQ"),
    ("Editing Fundamentals", 252, "XrXcvj1Hfzk"),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let user = User::new(
        args.user_id,
        args.email.clone(),
        args.username.clone(),
        Some("Test User".into()),
        AuthProvider::Email,
        true,
        now,
    )?;
    storage.users.upsert_user(&user).await?;

    let course = Course::new(
        args.course_id,
        "Fortnite Test Course",
        Some("A short course covering settings, keybinds, building and editing.".into()),
        Some("Get comfortable with the basics".into()),
        Price::new(0.0, "USD")?,
        None,
        true,
        now,
    )?;
    storage.catalog.upsert_course(&course).await?;

    let module_id = ModuleId::new(args.course_id.value());
    let module = Module::new(
        module_id,
        args.course_id,
        "Game Basics",
        Some("Settings and core mechanics".into()),
        1,
    )?;
    storage.catalog.upsert_module(&module).await?;

    let first_lesson = args.course_id.value().saturating_sub(1) * 100;
    for (order, (title, duration, video)) in (1_i32..).zip(DEMO_LESSONS) {
        let lesson = Lesson::new(
            LessonId::new(first_lesson + u64::from(order.unsigned_abs())),
            module_id,
            title,
            None,
            parse_url(&format!("https://www.youtube.com/watch?v={video}"))?,
            Some(duration),
            order,
        )?;
        storage.catalog.upsert_lesson(&lesson).await?;
    }

    let resources = [
        (
            "Settings Guide",
            ResourceType::Pdf,
            Some("https://example.com/settings-guide.pdf"),
            Some("settings-guide.pdf"),
        ),
        (
            "Locations Map",
            ResourceType::Link,
            Some("https://fortnite.gg/map"),
            None,
        ),
        (
            "Training Template",
            ResourceType::Template,
            Some("https://example.com/training-template.xlsx"),
            Some("training-template.xlsx"),
        ),
    ];
    let first_resource = args.course_id.value().saturating_sub(1) * 100;
    for (order, (title, kind, url, file_name)) in (1_i32..).zip(resources) {
        let resource = CourseResource::new(
            ResourceId::new(first_resource + u64::from(order.unsigned_abs())),
            args.course_id,
            title,
            None,
            kind,
            url.map(parse_url).transpose()?,
            file_name.map(str::to_owned),
            order,
            now,
        )?;
        storage.resources.upsert_resource(&resource).await?;
    }

    println!(
        "Seeded user {} and course {} ({} lessons, {} resources) into {}",
        args.user_id,
        args.course_id,
        DEMO_LESSONS.len(),
        resources.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
