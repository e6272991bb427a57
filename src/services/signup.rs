// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout signup service.
//!
//! Each operation runs in one transaction that starts by locking the
//! workout row:
//! 1. Lock the workout (404 if missing or deleted)
//! 2. Read the caller's signup/waitlist state and the signup count
//! 3. Apply the step chosen by the signup rules
//! 4. Commit, then hand notifications to the dispatcher
//!
//! Any error before the commit drops the transaction, which rolls back
//! every write made so far.

use crate::db::workouts::WorkoutChanges;
use crate::db::{records, roster, users, workouts, Db};
use crate::error::{AppError, Result};
use crate::models::{
    AttendanceRecord, CancellationRecord, Role, Signup, WaitlistEntry, Workout,
};
use crate::services::notify::{Notification, NotificationService};
use crate::services::promoter::WaitlistPromoter;
use crate::signup::machine::check_join_waitlist;
use crate::signup::{
    capacity, classify, plan_toggle, try_reserve_slot, PromotionOutcome, SignupState,
    ToggleOutcome, ToggleStep, VacancyReason,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::PgConnection;

/// Result of a workout edit.
#[derive(Debug, Clone)]
pub struct WorkoutUpdate {
    pub workout: Workout,
    /// Waitlist entries moved into signups by a capacity increase
    pub promoted: Vec<WaitlistEntry>,
}

/// Snapshot of a workout's roster as seen by one member.
#[derive(Debug, Clone)]
pub struct WorkoutRoster {
    pub workout: Workout,
    pub start: Option<DateTime<Utc>>,
    pub signups: Vec<Signup>,
    pub waitlist: Vec<WaitlistEntry>,
    pub my_state: SignupState,
}

/// One line of a staff attendance submission.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceMark {
    pub user_id: i64,
    pub attended: bool,
    pub late: bool,
}

/// Signup/waitlist/cancellation orchestration.
#[derive(Clone)]
pub struct SignupService {
    db: Db,
    notifier: NotificationService,
    tz: Tz,
}

impl SignupService {
    pub fn new(db: Db, notifier: NotificationService, tz: Tz) -> Self {
        Self { db, notifier, tz }
    }

    // ─── Toggle ──────────────────────────────────────────────────

    /// Sign up if not signed up, cancel if signed up.
    pub async fn toggle_signup(&self, workout_id: i64, user_id: i64) -> Result<ToggleOutcome> {
        self.toggle_signup_at(workout_id, user_id, Utc::now()).await
    }

    /// [`Self::toggle_signup`] with an explicit "now" for the cutoff check.
    pub async fn toggle_signup_at(
        &self,
        workout_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome> {
        let mut tx = self.db.begin().await?;

        let workout = lock_live_workout(&mut tx, workout_id).await?;
        let state = member_state(&mut tx, workout_id, user_id).await?;
        let count = roster::signup_count(&mut tx, workout_id).await?;
        let step = plan_toggle(state, try_reserve_slot(workout.capacity, count));

        tracing::debug!(workout_id, user_id, ?state, ?step, count, "Toggling signup");

        let (outcome, notifications) = match step {
            ToggleStep::Cancel => self.cancel(&mut tx, &workout, user_id, now).await?,
            ToggleStep::Reserve => {
                if roster::insert_signup_if_room(&mut tx, workout_id, user_id, workout.capacity)
                    .await?
                {
                    if state == SignupState::Waitlisted {
                        roster::delete_waitlist(&mut tx, workout_id, user_id).await?;
                    }
                    tracing::info!(workout_id, user_id, "Signed up");
                    (ToggleOutcome::signed_up(), vec![])
                } else {
                    // Only reachable if the count moved under us; fall back to the waitlist.
                    roster::insert_waitlist(&mut tx, workout_id, user_id).await?;
                    tracing::warn!(workout_id, user_id, "Slot vanished, waitlisted instead");
                    (ToggleOutcome::waitlisted(), vec![])
                }
            }
            ToggleStep::JoinWaitlist => {
                roster::insert_waitlist(&mut tx, workout_id, user_id).await?;
                tracing::info!(workout_id, user_id, "Workout full, added to waitlist");
                (ToggleOutcome::waitlisted(), vec![])
            }
            ToggleStep::StayWaitlisted => (ToggleOutcome::waitlisted(), vec![]),
        };

        tx.commit().await?;
        self.notifier.dispatch(notifications);

        Ok(outcome)
    }

    /// Cancel a signup: classify, record, count the absence, resolve the vacancy.
    async fn cancel(
        &self,
        conn: &mut PgConnection,
        workout: &Workout,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(ToggleOutcome, Vec<Notification>)> {
        let classification = classify(workout.start_instant(self.tz), now);
        let is_late = classification.is_late;

        roster::delete_signup(&mut *conn, workout.id, user_id).await?;
        // A repeat cancellation of a workout already counted as missed keeps
        // the earlier record and does not count a second absence.
        let recorded = records::upsert_cancellation(
            &mut *conn,
            &CancellationRecord {
                post_id: workout.id,
                user_id,
                cancelled_at: now,
                within_12hrs: is_late,
                marked_absent: is_late,
            },
        )
        .await?;

        if is_late && recorded {
            records::upsert_missed_attendance(&mut *conn, workout.id, user_id).await?;
            users::increment_absences(&mut *conn, user_id).await?;
        }

        tracing::info!(
            workout_id = workout.id,
            user_id,
            is_late,
            absence_counted = is_late && recorded,
            hours_until_start = ?classification.hours_until_start,
            "Signup cancelled"
        );

        let outcome = WaitlistPromoter::on_vacancy(
            &mut *conn,
            workout,
            VacancyReason::from_cancellation(is_late),
        )
        .await?;

        let notifications = match outcome {
            PromotionOutcome::Promoted(entry) => {
                vec![Notification::waitlist_promotion(entry.user_id, workout)]
            }
            PromotionOutcome::Offered(entry) => {
                vec![Notification::last_minute_opportunity(entry.user_id, workout)]
            }
            PromotionOutcome::NoOne => vec![],
        };

        Ok((ToggleOutcome::cancelled(is_late), notifications))
    }

    // ─── Explicit Waitlist ───────────────────────────────────────

    /// Join the waitlist of a full workout. Returns the 1-based position.
    pub async fn join_waitlist(&self, workout_id: i64, user_id: i64) -> Result<usize> {
        let mut tx = self.db.begin().await?;

        let workout = lock_live_workout(&mut tx, workout_id).await?;
        let state = member_state(&mut tx, workout_id, user_id).await?;
        let count = roster::signup_count(&mut tx, workout_id).await?;
        check_join_waitlist(state, try_reserve_slot(workout.capacity, count))?;

        roster::insert_waitlist(&mut tx, workout_id, user_id).await?;
        let waitlist = roster::list_waitlist(&mut tx, workout_id).await?;
        tx.commit().await?;

        let position = waitlist
            .iter()
            .position(|entry| entry.user_id == user_id)
            .map(|idx| idx + 1)
            .unwrap_or(waitlist.len());

        tracing::info!(workout_id, user_id, position, "Joined waitlist");
        Ok(position)
    }

    /// Withdraw from the waitlist.
    pub async fn leave_waitlist(&self, workout_id: i64, user_id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;

        lock_live_workout(&mut tx, workout_id).await?;
        if !roster::delete_waitlist(&mut tx, workout_id, user_id).await? {
            return Err(AppError::NotFound(format!(
                "User {} is not on the waitlist for workout {}",
                user_id, workout_id
            )));
        }
        tx.commit().await?;

        tracing::info!(workout_id, user_id, "Left waitlist");
        Ok(())
    }

    // ─── Workout Edits ───────────────────────────────────────────

    /// Edit a workout. A capacity increase promotes waitlisted users into
    /// the freed slots in the same transaction.
    pub async fn update_workout(
        &self,
        workout_id: i64,
        editor_id: i64,
        editor_role: Role,
        changes: &WorkoutChanges,
    ) -> Result<WorkoutUpdate> {
        if let Some(Some(capacity)) = changes.capacity {
            if capacity < 1 {
                return Err(AppError::BadRequest(
                    "Capacity must be at least 1, or null for unlimited".to_string(),
                ));
            }
        }

        let mut tx = self.db.begin().await?;

        let before = lock_live_workout(&mut tx, workout_id).await?;
        if !before.can_edit(editor_id, editor_role) {
            return Err(AppError::Forbidden(
                "Only the author, execs and admins can edit this workout".to_string(),
            ));
        }

        let workout = workouts::update_workout(&mut tx, workout_id, changes).await?;

        let promoted = if capacity::is_capacity_increase(before.capacity, workout.capacity) {
            let count = roster::signup_count(&mut tx, workout_id).await?;
            let slots = capacity::slots_freed(workout.capacity, count);
            WaitlistPromoter::fill_freed_slots(&mut tx, &workout, slots).await?
        } else {
            vec![]
        };

        tx.commit().await?;

        tracing::info!(
            workout_id,
            editor_id,
            old_capacity = ?before.capacity,
            new_capacity = ?workout.capacity,
            promoted = promoted.len(),
            "Workout updated"
        );

        self.notifier.dispatch(
            promoted
                .iter()
                .map(|entry| Notification::waitlist_promotion(entry.user_id, &workout))
                .collect(),
        );

        Ok(WorkoutUpdate { workout, promoted })
    }

    /// Soft-delete a workout and drop its signups and waitlist.
    /// Cancellation and attendance history is kept.
    pub async fn delete_workout(&self, workout_id: i64, editor_id: i64, editor_role: Role) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let workout = lock_live_workout(&mut tx, workout_id).await?;
        if !workout.can_edit(editor_id, editor_role) {
            return Err(AppError::Forbidden(
                "Only the author, execs and admins can delete this workout".to_string(),
            ));
        }

        let removed = roster::clear_roster(&mut tx, workout_id).await?;
        workouts::soft_delete(&mut tx, workout_id).await?;
        tx.commit().await?;

        tracing::info!(workout_id, editor_id, removed, "Workout deleted");
        Ok(())
    }

    // ─── Attendance ──────────────────────────────────────────────

    /// Record attendance taken by an exec or admin.
    pub async fn record_attendance(
        &self,
        workout_id: i64,
        recorder_id: i64,
        recorder_role: Role,
        marks: &[AttendanceMark],
    ) -> Result<Vec<AttendanceRecord>> {
        if !recorder_role.is_privileged() {
            return Err(AppError::Forbidden(
                "Only execs and admins can record attendance".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        lock_live_workout(&mut tx, workout_id).await?;

        let mut recorded = Vec::with_capacity(marks.len());
        for mark in marks {
            recorded.push(
                records::upsert_attendance(
                    &mut tx,
                    workout_id,
                    mark.user_id,
                    mark.attended,
                    mark.late,
                    recorder_id,
                )
                .await?,
            );
        }
        tx.commit().await?;

        tracing::info!(workout_id, recorder_id, count = recorded.len(), "Attendance recorded");
        Ok(recorded)
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Roster of a workout plus the caller's own state.
    pub async fn workout_roster(&self, workout_id: i64, user_id: i64) -> Result<WorkoutRoster> {
        let mut conn = self.db.pool().acquire().await?;

        let workout = workouts::get_workout(&mut conn, workout_id)
            .await?
            .ok_or_else(|| AppError::workout_not_found(workout_id))?;
        let signups = roster::list_signups(&mut conn, workout_id).await?;
        let waitlist = roster::list_waitlist(&mut conn, workout_id).await?;

        let my_state = SignupState::from_rows(
            signups.iter().any(|s| s.user_id == user_id),
            waitlist.iter().any(|w| w.user_id == user_id),
        )?;

        Ok(WorkoutRoster {
            start: workout.start_instant(self.tz),
            workout,
            signups,
            waitlist,
            my_state,
        })
    }
}

async fn lock_live_workout(conn: &mut PgConnection, workout_id: i64) -> Result<Workout> {
    workouts::lock_workout(conn, workout_id)
        .await?
        .ok_or_else(|| AppError::workout_not_found(workout_id))
}

async fn member_state(conn: &mut PgConnection, workout_id: i64, user_id: i64) -> Result<SignupState> {
    let (signed_up, waitlisted) = roster::membership(conn, workout_id, user_id).await?;
    SignupState::from_rows(signed_up, waitlisted)
}
