// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout posts.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// A forum post of type `workout`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Workout {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    /// Swim, bike, run, brick...
    pub workout_type: Option<String>,
    /// Local calendar date in the club timezone
    pub workout_date: Option<NaiveDate>,
    /// Local wall-clock start; without it late cancellations cannot be detected
    pub workout_time: Option<NaiveTime>,
    /// Maximum signups; `None` is unlimited
    pub capacity: Option<i32>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// Absolute start instant, if date and time are both set.
    pub fn start_instant(&self, tz: Tz) -> Option<DateTime<Utc>> {
        crate::time_utils::resolve_start(self.workout_date, self.workout_time, tz)
    }

    /// Whether `user_id` may edit or delete this workout.
    pub fn can_edit(&self, user_id: i64, role: crate::models::Role) -> bool {
        self.author_id == user_id || role.is_privileged()
    }
}
