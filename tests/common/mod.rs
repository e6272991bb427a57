// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use triclub::config::Config;
use triclub::db::workouts::{insert_workout, NewWorkout};
use triclub::db::{users, Db};
use triclub::middleware::auth::create_jwt;
use triclub::models::{Role, User, Workout};
use triclub::routes::create_router;
use triclub::services::{NotificationService, SignupService};
use triclub::time_utils::resolve_start;
use triclub::AppState;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and bring its schema up to date.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let config = Config {
        database_url: std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set"),
        database_max_connections: 20,
        database_acquire_timeout_secs: 10,
        ..Config::test_default()
    };
    let db = Db::connect(&config)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

/// Pool that never connects (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    Db::connect_lazy(&Config::test_default()).expect("Failed to build lazy pool")
}

/// Create a test app with an offline pool and a recording notifier.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        test_db_offline(),
        NotificationService::recording(),
    ));
    (create_router(state.clone()), state)
}

/// Session token for `user_id` signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: i64, role: Role) -> String {
    create_jwt(user_id, role, &Config::test_default().jwt_signing_key)
        .expect("Failed to create test JWT")
}

/// Signup service over `db` with a recording notifier.
#[allow(dead_code)]
pub fn signup_service(db: &Db) -> (SignupService, NotificationService) {
    let notifier = NotificationService::recording();
    let service = SignupService::new(
        db.clone(),
        notifier.clone(),
        Config::test_default().club_timezone,
    );
    (service, notifier)
}

static UNIQUE: AtomicU64 = AtomicU64::new(0);

/// Insert a user with a unique email.
#[allow(dead_code)]
pub async fn create_user(db: &Db, role: Role) -> User {
    let n = UNIQUE.fetch_add(1, Ordering::Relaxed);
    let email = format!(
        "member-{}-{}-{}@example.com",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        n
    );
    let mut conn = db.pool().acquire().await.unwrap();
    users::insert_user(&mut conn, &email, "Test Member", role)
        .await
        .expect("Failed to create test user")
}

/// Several members at once.
#[allow(dead_code)]
pub async fn create_members(db: &Db, count: usize) -> Vec<User> {
    let mut members = Vec::with_capacity(count);
    for _ in 0..count {
        members.push(create_user(db, Role::Member).await);
    }
    members
}

/// A fixed local schedule well away from DST transitions.
#[allow(dead_code)]
pub fn summer_schedule() -> (NaiveDate, NaiveTime) {
    (
        NaiveDate::from_ymd_opt(2031, 7, 15).unwrap(),
        NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
    )
}

/// UTC start instant of [`summer_schedule`] in the club timezone.
#[allow(dead_code)]
pub fn summer_start() -> DateTime<Utc> {
    let (date, time) = summer_schedule();
    resolve_start(Some(date), Some(time), Config::test_default().club_timezone).unwrap()
}

/// `hours` before the summer workout starts.
#[allow(dead_code)]
pub fn hours_before_start(hours: i64) -> DateTime<Utc> {
    summer_start() - Duration::hours(hours)
}

/// Insert a workout on the summer schedule.
#[allow(dead_code)]
pub async fn create_workout(db: &Db, author_id: i64, capacity: Option<i32>) -> Workout {
    let (date, time) = summer_schedule();
    insert_test_workout(db, author_id, capacity, Some(date), Some(time)).await
}

/// Insert a workout with no date or time set.
#[allow(dead_code)]
pub async fn create_unscheduled_workout(
    db: &Db,
    author_id: i64,
    capacity: Option<i32>,
) -> Workout {
    insert_test_workout(db, author_id, capacity, None, None).await
}

#[allow(dead_code)]
async fn insert_test_workout(
    db: &Db,
    author_id: i64,
    capacity: Option<i32>,
    workout_date: Option<NaiveDate>,
    workout_time: Option<NaiveTime>,
) -> Workout {
    let mut conn = db.pool().acquire().await.unwrap();
    insert_workout(
        &mut conn,
        &NewWorkout {
            author_id,
            title: "Track intervals".to_string(),
            body: "6x800 at 5k pace".to_string(),
            workout_type: Some("run".to_string()),
            workout_date,
            workout_time,
            capacity,
        },
    )
    .await
    .expect("Failed to create test workout")
}

/// Re-read a user's absence count.
#[allow(dead_code)]
pub async fn absences(db: &Db, user_id: i64) -> i32 {
    let mut conn = db.pool().acquire().await.unwrap();
    users::get_user(&mut conn, user_id)
        .await
        .unwrap()
        .expect("user exists")
        .absences
}
