// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waitlist promotion against an open transaction.

use crate::db::roster;
use crate::error::Result;
use crate::models::{WaitlistEntry, Workout};
use crate::signup::{action_for, PromotionAction, PromotionOutcome, VacancyReason};
use sqlx::PgConnection;

/// Resolves vacancies by promoting or offering to the head of the waitlist.
pub struct WaitlistPromoter;

impl WaitlistPromoter {
    /// Resolve a single vacancy in `workout`.
    ///
    /// The caller must already hold the workout row lock. The chosen entry is
    /// itself locked with `SKIP LOCKED`.
    pub async fn on_vacancy(
        conn: &mut PgConnection,
        workout: &Workout,
        reason: VacancyReason,
    ) -> Result<PromotionOutcome> {
        let Some(head) = roster::lock_waitlist_head(&mut *conn, workout.id).await? else {
            return Ok(PromotionOutcome::NoOne);
        };

        match action_for(reason) {
            PromotionAction::Offer => {
                tracing::info!(
                    workout_id = workout.id,
                    user_id = head.user_id,
                    "Late vacancy offered to head of waitlist"
                );
                Ok(PromotionOutcome::Offered(head))
            }
            PromotionAction::Promote => {
                let inserted = roster::insert_signup_if_room(
                    &mut *conn,
                    workout.id,
                    head.user_id,
                    workout.capacity,
                )
                .await?;
                if !inserted {
                    return Ok(PromotionOutcome::NoOne);
                }
                roster::delete_waitlist_entry(&mut *conn, head.id).await?;

                tracing::info!(
                    workout_id = workout.id,
                    user_id = head.user_id,
                    reason = ?reason,
                    "Promoted from waitlist"
                );
                Ok(PromotionOutcome::Promoted(head))
            }
        }
    }

    /// Promote waitlisted users into freed slots, FIFO.
    ///
    /// `slots == None` means unlimited: the whole waitlist is promoted.
    pub async fn fill_freed_slots(
        conn: &mut PgConnection,
        workout: &Workout,
        slots: Option<u64>,
    ) -> Result<Vec<WaitlistEntry>> {
        let mut promoted = Vec::new();

        while slots.map_or(true, |n| (promoted.len() as u64) < n) {
            match Self::on_vacancy(&mut *conn, workout, VacancyReason::CapacityIncrease).await? {
                PromotionOutcome::Promoted(entry) => promoted.push(entry),
                PromotionOutcome::Offered(_) | PromotionOutcome::NoOne => break,
            }
        }

        Ok(promoted)
    }
}
