// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup and waitlist queries.

use crate::error::Result;
use crate::models::{Signup, WaitlistEntry};
use sqlx::PgConnection;

/// Current number of signups for a workout.
pub async fn signup_count(conn: &mut PgConnection, post_id: i64) -> Result<i64> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM workout_signups WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(conn)
            .await?,
    )
}

/// Whether the user holds a signup and/or a waitlist entry.
pub async fn membership(conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<(bool, bool)> {
    Ok(sqlx::query_as(
        "SELECT \
             EXISTS(SELECT 1 FROM workout_signups WHERE post_id = $1 AND user_id = $2), \
             EXISTS(SELECT 1 FROM workout_waitlist WHERE post_id = $1 AND user_id = $2)",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?)
}

/// Insert a signup only if the workout still has room.
///
/// The capacity check and the insert are one statement, so two requests
/// that both saw a free slot cannot both succeed. Returns `false` when the
/// workout is full or the user already holds a signup.
pub async fn insert_signup_if_room(
    conn: &mut PgConnection,
    post_id: i64,
    user_id: i64,
    capacity: Option<i32>,
) -> Result<bool> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO workout_signups (post_id, user_id) \
         SELECT $1, $2 \
         WHERE $3::INTEGER IS NULL \
            OR (SELECT COUNT(*) FROM workout_signups WHERE post_id = $1) < $3::INTEGER \
         ON CONFLICT (post_id, user_id) DO NOTHING \
         RETURNING id",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(capacity)
    .fetch_optional(conn)
    .await?;
    Ok(inserted.is_some())
}

/// Remove a signup. Returns whether a row was deleted.
pub async fn delete_signup(conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workout_signups WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add the user to the waitlist. Returns `false` if already present.
pub async fn insert_waitlist(conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO workout_waitlist (post_id, user_id) VALUES ($1, $2) \
         ON CONFLICT (post_id, user_id) DO NOTHING",
    )
    .bind(post_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove the user's waitlist entry. Returns whether a row was deleted.
pub async fn delete_waitlist(conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workout_waitlist WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a waitlist entry by id.
pub async fn delete_waitlist_entry(conn: &mut PgConnection, entry_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM workout_waitlist WHERE id = $1")
        .bind(entry_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Earliest-joined waitlist entry, locked for this transaction.
///
/// Rows already locked by a concurrent promoter are skipped, so two
/// vacancies resolved at once never pick the same user.
pub async fn lock_waitlist_head(
    conn: &mut PgConnection,
    post_id: i64,
) -> Result<Option<WaitlistEntry>> {
    Ok(sqlx::query_as::<_, WaitlistEntry>(
        "SELECT id, post_id, user_id, joined_at FROM workout_waitlist \
         WHERE post_id = $1 \
         ORDER BY joined_at ASC, id ASC \
         LIMIT 1 \
         FOR UPDATE SKIP LOCKED",
    )
    .bind(post_id)
    .fetch_optional(conn)
    .await?)
}

/// Signups in the order they were made.
pub async fn list_signups(conn: &mut PgConnection, post_id: i64) -> Result<Vec<Signup>> {
    Ok(sqlx::query_as::<_, Signup>(
        "SELECT post_id, user_id, signed_up_at FROM workout_signups \
         WHERE post_id = $1 ORDER BY signed_up_at ASC, id ASC",
    )
    .bind(post_id)
    .fetch_all(conn)
    .await?)
}

/// Waitlist in FIFO order.
pub async fn list_waitlist(conn: &mut PgConnection, post_id: i64) -> Result<Vec<WaitlistEntry>> {
    Ok(sqlx::query_as::<_, WaitlistEntry>(
        "SELECT id, post_id, user_id, joined_at FROM workout_waitlist \
         WHERE post_id = $1 ORDER BY joined_at ASC, id ASC",
    )
    .bind(post_id)
    .fetch_all(conn)
    .await?)
}

/// Drop every signup and waitlist entry for a workout. Returns rows removed.
pub async fn clear_roster(conn: &mut PgConnection, post_id: i64) -> Result<u64> {
    let signups = sqlx::query("DELETE FROM workout_signups WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;
    let waitlist = sqlx::query("DELETE FROM workout_waitlist WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;
    Ok(signups.rows_affected() + waitlist.rows_affected())
}
