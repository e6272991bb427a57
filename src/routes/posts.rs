// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout post edit and delete routes.

use crate::db::workouts::WorkoutChanges;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::time_utils::{format_utc_rfc3339, parse_local_date, parse_local_time};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::put,
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Post routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/posts/{id}", put(update_post).delete(delete_post))
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial edit of a workout post. Omitted fields are left alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub body: Option<String>,
    /// `YYYY-MM-DD` in the club timezone, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub workout_date: Option<Option<String>>,
    /// `HH:MM` or `HH:MM:SS` in the club timezone, or `null` to clear
    #[serde(default, deserialize_with = "double_option")]
    pub workout_time: Option<Option<String>>,
    /// Positive limit, or `null` for unlimited
    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i32>>,
}

impl UpdatePostRequest {
    /// Validate and convert into store-level changes.
    pub fn into_changes(self) -> Result<WorkoutChanges> {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if let Some(Some(capacity)) = self.capacity {
            if capacity < 1 {
                return Err(AppError::BadRequest(
                    "Capacity must be at least 1, or null for unlimited".to_string(),
                ));
            }
        }

        let workout_date = self
            .workout_date
            .map(|d| {
                d.map(|raw| {
                    parse_local_date(&raw).ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid workoutDate '{}'", raw))
                    })
                })
                .transpose()
            })
            .transpose()?;

        let workout_time = self
            .workout_time
            .map(|t| {
                t.map(|raw| {
                    parse_local_time(&raw).ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid workoutTime '{}'", raw))
                    })
                })
                .transpose()
            })
            .transpose()?;

        Ok(WorkoutChanges {
            title: self.title,
            body: self.body,
            workout_date,
            workout_time,
            capacity: self.capacity,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdatePostResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub title: String,
    pub workout_date: Option<String>,
    pub workout_time: Option<String>,
    pub capacity: Option<i32>,
    pub updated_at: String,
    /// Users moved off the waitlist by a capacity increase, in FIFO order
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<number>"))]
    pub promoted_user_ids: Vec<i64>,
}

/// Edit a workout post (author, exec or admin).
async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<UpdatePostResponse>> {
    let changes = request.into_changes()?;

    let update = state
        .signups
        .update_workout(post_id, user.user_id, user.role, &changes)
        .await?;

    let workout = update.workout;
    Ok(Json(UpdatePostResponse {
        id: workout.id,
        title: workout.title,
        workout_date: workout.workout_date.map(|d| d.format("%Y-%m-%d").to_string()),
        workout_time: workout.workout_time.map(|t| t.format("%H:%M:%S").to_string()),
        capacity: workout.capacity,
        updated_at: format_utc_rfc3339(workout.updated_at),
        promoted_user_ids: update.promoted.iter().map(|e| e.user_id).collect(),
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeletePostResponse {
    pub success: bool,
}

/// Soft-delete a workout post. Its signups and waitlist go with it.
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<i64>,
) -> Result<Json<DeletePostResponse>> {
    state
        .signups
        .delete_workout(post_id, user.user_id, user.role)
        .await?;
    Ok(Json(DeletePostResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn parse(json: &str) -> UpdatePostRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_absent_and_null_capacity_differ() {
        assert_eq!(parse("{}").capacity, None);
        assert_eq!(parse(r#"{"capacity": null}"#).capacity, Some(None));
        assert_eq!(parse(r#"{"capacity": 4}"#).capacity, Some(Some(4)));
    }

    #[test]
    fn test_into_changes_parses_local_schedule() {
        let changes = parse(r#"{"workoutDate": "2024-07-02", "workoutTime": "06:30"}"#)
            .into_changes()
            .unwrap();
        assert_eq!(
            changes.workout_date,
            Some(NaiveDate::from_ymd_opt(2024, 7, 2))
        );
        assert_eq!(
            changes.workout_time,
            Some(NaiveTime::from_hms_opt(6, 30, 0))
        );
        assert_eq!(changes.capacity, None);
    }

    #[test]
    fn test_null_date_clears_schedule() {
        let changes = parse(r#"{"workoutDate": null}"#).into_changes().unwrap();
        assert_eq!(changes.workout_date, Some(None));
        assert_eq!(changes.workout_time, None);
    }

    #[test]
    fn test_bad_inputs_are_bad_requests() {
        for body in [
            r#"{"capacity": 0}"#,
            r#"{"capacity": -3}"#,
            r#"{"workoutDate": "07/02/2024"}"#,
            r#"{"workoutTime": "25:00"}"#,
            r#"{"title": ""}"#,
        ] {
            let err = parse(body).into_changes().unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{}", body);
        }
    }
}
