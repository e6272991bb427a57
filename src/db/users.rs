// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User queries.

use crate::error::Result;
use crate::models::{Role, User};
use sqlx::PgConnection;

const USER_COLUMNS: &str = "id, email, name, role, absences, created_at";

pub async fn get_user(conn: &mut PgConnection, user_id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(conn)
        .await?)
}

pub async fn insert_user(conn: &mut PgConnection, email: &str, name: &str, role: Role) -> Result<User> {
    let sql = format!(
        "INSERT INTO users (email, name, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .fetch_one(conn)
        .await?)
}

/// Count one more absence.
pub async fn increment_absences(conn: &mut PgConnection, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET absences = absences + 1 WHERE id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Take back one absence, never going below zero.
pub async fn decrement_absences(conn: &mut PgConnection, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET absences = GREATEST(absences - 1, 0) WHERE id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
