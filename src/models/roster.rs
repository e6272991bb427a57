// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Signup, waitlist, cancellation and attendance rows.
//!
//! Every table is unique on `(post_id, user_id)`.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A confirmed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub post_id: i64,
    pub user_id: i64,
    pub signed_up_at: DateTime<Utc>,
}

/// A FIFO request for a slot. Ordered by `joined_at`, then `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

/// Latest cancellation by a user for a workout. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRecord {
    pub post_id: i64,
    pub user_id: i64,
    pub cancelled_at: DateTime<Utc>,
    pub within_12hrs: bool,
    pub marked_absent: bool,
}

/// Attendance for a workout. `recorded_by` is `None` for rows synthesized
/// from a late cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub post_id: i64,
    pub user_id: i64,
    pub attended: bool,
    pub late: bool,
    pub recorded_by: Option<i64>,
    pub recorded_at: DateTime<Utc>,
}
