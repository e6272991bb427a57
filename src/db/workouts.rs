// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout post queries.

use crate::error::Result;
use crate::models::Workout;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgConnection;

const WORKOUT_COLUMNS: &str = "id, author_id, title, body, workout_type, workout_date, \
     workout_time, capacity, is_deleted, created_at, updated_at";

/// Fields for a new workout post.
#[derive(Debug, Clone, Default)]
pub struct NewWorkout {
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub workout_type: Option<String>,
    pub workout_date: Option<NaiveDate>,
    pub workout_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
}

/// Partial update. `None` leaves a column alone; `Some(None)` clears a
/// nullable column.
#[derive(Debug, Clone, Default)]
pub struct WorkoutChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub workout_date: Option<Option<NaiveDate>>,
    pub workout_time: Option<Option<NaiveTime>>,
    pub capacity: Option<Option<i32>>,
}

/// Fetch a live workout without locking.
pub async fn get_workout(conn: &mut PgConnection, workout_id: i64) -> Result<Option<Workout>> {
    let sql = format!(
        "SELECT {WORKOUT_COLUMNS} FROM forum_posts \
         WHERE id = $1 AND post_type = 'workout' AND NOT is_deleted"
    );
    Ok(sqlx::query_as::<_, Workout>(&sql)
        .bind(workout_id)
        .fetch_optional(conn)
        .await?)
}

/// Fetch a live workout and hold its row lock until the transaction ends.
///
/// Every signup, cancellation and capacity edit for one workout takes this
/// lock first, which serializes them.
pub async fn lock_workout(conn: &mut PgConnection, workout_id: i64) -> Result<Option<Workout>> {
    let sql = format!(
        "SELECT {WORKOUT_COLUMNS} FROM forum_posts \
         WHERE id = $1 AND post_type = 'workout' AND NOT is_deleted \
         FOR UPDATE"
    );
    Ok(sqlx::query_as::<_, Workout>(&sql)
        .bind(workout_id)
        .fetch_optional(conn)
        .await?)
}

/// Insert a workout post.
pub async fn insert_workout(conn: &mut PgConnection, new: &NewWorkout) -> Result<Workout> {
    let sql = format!(
        "INSERT INTO forum_posts \
         (author_id, post_type, title, body, workout_type, workout_date, workout_time, capacity) \
         VALUES ($1, 'workout', $2, $3, $4, $5, $6, $7) \
         RETURNING {WORKOUT_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, Workout>(&sql)
        .bind(new.author_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.workout_type)
        .bind(new.workout_date)
        .bind(new.workout_time)
        .bind(new.capacity)
        .fetch_one(conn)
        .await?)
}

/// Apply a partial update and return the new row.
pub async fn update_workout(
    conn: &mut PgConnection,
    workout_id: i64,
    changes: &WorkoutChanges,
) -> Result<Workout> {
    let sql = format!(
        "UPDATE forum_posts SET \
             title = COALESCE($2, title), \
             body = COALESCE($3, body), \
             workout_date = CASE WHEN $4 THEN $5 ELSE workout_date END, \
             workout_time = CASE WHEN $6 THEN $7 ELSE workout_time END, \
             capacity = CASE WHEN $8 THEN $9 ELSE capacity END, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {WORKOUT_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, Workout>(&sql)
        .bind(workout_id)
        .bind(&changes.title)
        .bind(&changes.body)
        .bind(changes.workout_date.is_some())
        .bind(changes.workout_date.flatten())
        .bind(changes.workout_time.is_some())
        .bind(changes.workout_time.flatten())
        .bind(changes.capacity.is_some())
        .bind(changes.capacity.flatten())
        .fetch_one(conn)
        .await?)
}

/// Mark a workout deleted.
pub async fn soft_delete(conn: &mut PgConnection, workout_id: i64) -> Result<()> {
    sqlx::query("UPDATE forum_posts SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(workout_id)
        .execute(conn)
        .await?;
    Ok(())
}
