// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout signup, waitlist, roster and attendance routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::{AttendanceMark, WorkoutRoster};
use crate::signup::{SignupState, ToggleOutcome};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_ATTENDANCE_BATCH: u64 = 500;

/// Workout routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts/{id}", get(get_workout))
        .route("/workouts/{id}/signup", post(toggle_signup))
        .route(
            "/workouts/{id}/waitlist",
            post(join_waitlist).delete(leave_waitlist),
        )
        .route("/workouts/{id}/attendance", post(record_attendance))
}

// ─── Signup Toggle ───────────────────────────────────────────

/// Sign up for a workout, or cancel an existing signup.
///
/// A full workout puts the caller on the waitlist instead.
async fn toggle_signup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
) -> Result<Json<ToggleOutcome>> {
    let outcome = state.signups.toggle_signup(workout_id, user.user_id).await?;
    Ok(Json(outcome))
}

// ─── Waitlist ────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WaitlistResponse {
    pub waitlisted: bool,
    /// 1-based position after joining; absent after leaving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

async fn join_waitlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
) -> Result<Json<WaitlistResponse>> {
    let position = state.signups.join_waitlist(workout_id, user.user_id).await?;
    Ok(Json(WaitlistResponse {
        waitlisted: true,
        position: Some(position as u32),
    }))
}

async fn leave_waitlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
) -> Result<Json<WaitlistResponse>> {
    state.signups.leave_waitlist(workout_id, user.user_id).await?;
    Ok(Json(WaitlistResponse {
        waitlisted: false,
        position: None,
    }))
}

// ─── Workout Detail ──────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterSignup {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: i64,
    pub signed_up_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterWaitlistEntry {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: i64,
    pub position: u32,
    pub joined_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutDetailResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub title: String,
    pub body: String,
    pub workout_type: Option<String>,
    /// Local date, `YYYY-MM-DD`
    pub workout_date: Option<String>,
    /// Local time, `HH:MM:SS`
    pub workout_time: Option<String>,
    /// `null` means unlimited
    pub capacity: Option<i32>,
    /// Start instant in UTC, `null` when date or time is missing
    pub starts_at: Option<String>,
    /// `null` when unlimited
    pub spots_left: Option<i64>,
    pub signups: Vec<RosterSignup>,
    pub waitlist: Vec<RosterWaitlistEntry>,
    pub my_state: SignupState,
}

impl From<WorkoutRoster> for WorkoutDetailResponse {
    fn from(roster: WorkoutRoster) -> Self {
        let WorkoutRoster {
            workout,
            start,
            signups,
            waitlist,
            my_state,
        } = roster;

        let spots_left = workout
            .capacity
            .map(|cap| (i64::from(cap) - signups.len() as i64).max(0));

        Self {
            id: workout.id,
            title: workout.title,
            body: workout.body,
            workout_type: workout.workout_type,
            workout_date: workout.workout_date.map(|d| d.format("%Y-%m-%d").to_string()),
            workout_time: workout.workout_time.map(|t| t.format("%H:%M:%S").to_string()),
            capacity: workout.capacity,
            starts_at: start.map(format_utc_rfc3339),
            spots_left,
            signups: signups
                .into_iter()
                .map(|s| RosterSignup {
                    user_id: s.user_id,
                    signed_up_at: format_utc_rfc3339(s.signed_up_at),
                })
                .collect(),
            waitlist: waitlist
                .into_iter()
                .enumerate()
                .map(|(idx, w)| RosterWaitlistEntry {
                    user_id: w.user_id,
                    position: idx as u32 + 1,
                    joined_at: format_utc_rfc3339(w.joined_at),
                })
                .collect(),
            my_state,
        }
    }
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
) -> Result<Json<WorkoutDetailResponse>> {
    let roster = state.signups.workout_roster(workout_id, user.user_id).await?;
    Ok(Json(roster.into()))
}

// ─── Attendance ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub user_id: i64,
    pub attended: bool,
    #[serde(default)]
    pub late: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttendanceRequest {
    #[validate(length(min = 1, max = MAX_ATTENDANCE_BATCH))]
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AttendanceResponse {
    pub recorded: u32,
}

/// Record attendance (execs and admins).
async fn record_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
    Json(request): Json<AttendanceRequest>,
) -> Result<Json<AttendanceResponse>> {
    if !user.role.is_privileged() {
        return Err(AppError::Forbidden(
            "Only execs and admins can record attendance".to_string(),
        ));
    }
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let marks: Vec<AttendanceMark> = request
        .entries
        .iter()
        .map(|e| AttendanceMark {
            user_id: e.user_id,
            attended: e.attended,
            late: e.late,
        })
        .collect();

    let recorded = state
        .signups
        .record_attendance(workout_id, user.user_id, user.role, &marks)
        .await?;

    Ok(Json(AttendanceResponse {
        recorded: recorded.len() as u32,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AttendanceRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_attendance_batch_bounds() {
        assert!(parse(r#"{"entries": []}"#).validate().is_err());

        let one = parse(r#"{"entries": [{"userId": 4, "attended": true}]}"#);
        assert!(one.validate().is_ok());
        assert!(!one.entries[0].late);

        let entries: Vec<String> = (0..=MAX_ATTENDANCE_BATCH)
            .map(|id| format!(r#"{{"userId": {}, "attended": false}}"#, id))
            .collect();
        let too_many = parse(&format!(r#"{{"entries": [{}]}}"#, entries.join(",")));
        assert!(too_many.validate().is_err());
    }
}
