// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cancellation and attendance history.

use crate::error::Result;
use crate::models::{AttendanceRecord, CancellationRecord};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgConnection;

/// A cancellation joined with the schedule of its workout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduledCancellation {
    pub post_id: i64,
    pub user_id: i64,
    pub cancelled_at: DateTime<Utc>,
    pub within_12hrs: bool,
    pub marked_absent: bool,
    pub workout_date: Option<NaiveDate>,
    pub workout_time: Option<NaiveTime>,
}

// ─── Cancellations ───────────────────────────────────────────

/// Write the user's latest cancellation, replacing any earlier one.
///
/// A stored cancellation that was counted as an absence is never replaced,
/// so the record keeps backing the absence it caused. Returns false when
/// such a record was kept.
pub async fn upsert_cancellation(
    conn: &mut PgConnection,
    record: &CancellationRecord,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO workout_cancellations \
         (post_id, user_id, cancelled_at, within_12hrs, marked_absent) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (post_id, user_id) DO UPDATE SET \
             cancelled_at = EXCLUDED.cancelled_at, \
             within_12hrs = EXCLUDED.within_12hrs, \
             marked_absent = EXCLUDED.marked_absent \
         WHERE NOT workout_cancellations.marked_absent",
    )
    .bind(record.post_id)
    .bind(record.user_id)
    .bind(record.cancelled_at)
    .bind(record.within_12hrs)
    .bind(record.marked_absent)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_cancellation(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
) -> Result<Option<CancellationRecord>> {
    Ok(sqlx::query_as::<_, CancellationRecord>(
        "SELECT post_id, user_id, cancelled_at, within_12hrs, marked_absent \
         FROM workout_cancellations WHERE post_id = $1 AND user_id = $2",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?)
}

/// Every cancellation with its workout schedule, oldest first.
pub async fn list_scheduled_cancellations(
    conn: &mut PgConnection,
) -> Result<Vec<ScheduledCancellation>> {
    Ok(sqlx::query_as::<_, ScheduledCancellation>(
        "SELECT c.post_id, c.user_id, c.cancelled_at, c.within_12hrs, c.marked_absent, \
                p.workout_date, p.workout_time \
         FROM workout_cancellations c \
         JOIN forum_posts p ON p.id = c.post_id \
         ORDER BY c.cancelled_at ASC, c.id ASC",
    )
    .fetch_all(conn)
    .await?)
}

/// Re-read one cancellation under a row lock.
pub async fn lock_cancellation(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
) -> Result<Option<CancellationRecord>> {
    Ok(sqlx::query_as::<_, CancellationRecord>(
        "SELECT post_id, user_id, cancelled_at, within_12hrs, marked_absent \
         FROM workout_cancellations WHERE post_id = $1 AND user_id = $2 \
         FOR UPDATE",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?)
}

pub async fn set_cancellation_flags(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
    within_12hrs: bool,
    marked_absent: bool,
) -> Result<()> {
    sqlx::query(
        "UPDATE workout_cancellations SET within_12hrs = $3, marked_absent = $4 \
         WHERE post_id = $1 AND user_id = $2",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(within_12hrs)
    .bind(marked_absent)
    .execute(conn)
    .await?;
    Ok(())
}

// ─── Attendance ──────────────────────────────────────────────

/// Record a missed workout on behalf of nobody (late cancellation).
///
/// Attendance taken by a staff member is left as it is.
pub async fn upsert_missed_attendance(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO workout_attendance (post_id, user_id, attended, late, recorded_by) \
         VALUES ($1, $2, FALSE, FALSE, NULL) \
         ON CONFLICT (post_id, user_id) DO UPDATE SET \
             attended = FALSE, late = FALSE, recorded_at = NOW() \
         WHERE workout_attendance.recorded_by IS NULL",
    )
    .bind(post_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Record attendance taken by a staff member.
pub async fn upsert_attendance(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
    attended: bool,
    late: bool,
    recorded_by: i64,
) -> Result<AttendanceRecord> {
    Ok(sqlx::query_as::<_, AttendanceRecord>(
        "INSERT INTO workout_attendance (post_id, user_id, attended, late, recorded_by) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (post_id, user_id) DO UPDATE SET \
             attended = EXCLUDED.attended, late = EXCLUDED.late, \
             recorded_by = EXCLUDED.recorded_by, recorded_at = NOW() \
         RETURNING post_id, user_id, attended, late, recorded_by, recorded_at",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(attended)
    .bind(late)
    .bind(recorded_by)
    .fetch_one(conn)
    .await?)
}

pub async fn get_attendance(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
) -> Result<Option<AttendanceRecord>> {
    Ok(sqlx::query_as::<_, AttendanceRecord>(
        "SELECT post_id, user_id, attended, late, recorded_by, recorded_at \
         FROM workout_attendance WHERE post_id = $1 AND user_id = $2",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?)
}

/// Remove an attendance row only if it was synthesized from a cancellation.
pub async fn delete_synthesized_attendance(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM workout_attendance \
         WHERE post_id = $1 AND user_id = $2 AND recorded_by IS NULL AND NOT attended",
    )
    .bind(post_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
