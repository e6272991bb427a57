// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Historical recompute of late-cancellation flags.
//!
//! Re-runs the cutoff check for every stored cancellation, using the
//! recorded cancellation instant as "now", and repairs absences that were
//! counted (or missed) by older code. Each record is fixed in its own
//! transaction so one bad row does not undo the rest.

use crate::db::records::ScheduledCancellation;
use crate::db::{records, users, Db};
use crate::error::Result;
use crate::signup::classify;
use crate::time_utils::resolve_start;
use chrono_tz::Tz;

/// What to do with one stored cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclassification {
    /// Stored flags already match.
    Keep,
    /// Counted as an absence but is not late: un-count it.
    Clear,
    /// Late but never counted: count it.
    MarkAbsent,
    /// Absence accounting is right but `within_12hrs` is stale.
    FixFlag,
}

/// Decide how a stored cancellation must change given a fresh `is_late`.
pub fn plan(within_12hrs: bool, marked_absent: bool, is_late: bool) -> Reclassification {
    match (marked_absent, is_late) {
        (true, false) => Reclassification::Clear,
        (false, true) => Reclassification::MarkAbsent,
        _ if within_12hrs != is_late => Reclassification::FixFlag,
        _ => Reclassification::Keep,
    }
}

/// Counts from a reclassification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclassifyReport {
    pub examined: usize,
    pub unchanged: usize,
    pub cleared: usize,
    pub marked_absent: usize,
    pub flags_fixed: usize,
    /// Workouts without a date or time; these can never be late.
    pub unscheduled: usize,
}

/// Recompute every cancellation. With `dry_run` nothing is written.
pub async fn reclassify_cancellations(db: &Db, tz: Tz, dry_run: bool) -> Result<ReclassifyReport> {
    let mut conn = db.pool().acquire().await?;
    let cancellations = records::list_scheduled_cancellations(&mut conn).await?;
    drop(conn);

    let mut report = ReclassifyReport::default();

    for record in &cancellations {
        report.examined += 1;

        let start = resolve_start(record.workout_date, record.workout_time, tz);
        if start.is_none() {
            report.unscheduled += 1;
        }
        let is_late = classify(start, record.cancelled_at).is_late;

        let action = plan(record.within_12hrs, record.marked_absent, is_late);
        match action {
            Reclassification::Keep => {
                report.unchanged += 1;
                continue;
            }
            Reclassification::Clear => report.cleared += 1,
            Reclassification::MarkAbsent => report.marked_absent += 1,
            Reclassification::FixFlag => report.flags_fixed += 1,
        }

        tracing::info!(
            workout_id = record.post_id,
            user_id = record.user_id,
            ?action,
            is_late,
            dry_run,
            "Reclassifying cancellation"
        );

        if !dry_run {
            apply(db, record, tz).await?;
        }
    }

    tracing::info!(?report, dry_run, "Cancellation reclassification complete");
    Ok(report)
}

/// Re-read the record under lock and apply the fix.
async fn apply(db: &Db, record: &ScheduledCancellation, tz: Tz) -> Result<()> {
    let mut tx = db.begin().await?;

    // The member may have cancelled again since the scan; use the current row.
    let Some(current) = records::lock_cancellation(&mut tx, record.post_id, record.user_id).await?
    else {
        return Ok(());
    };
    let start = resolve_start(record.workout_date, record.workout_time, tz);
    let is_late = classify(start, current.cancelled_at).is_late;

    match plan(current.within_12hrs, current.marked_absent, is_late) {
        Reclassification::Keep => return Ok(()),
        Reclassification::Clear => {
            records::delete_synthesized_attendance(&mut tx, current.post_id, current.user_id)
                .await?;
            users::decrement_absences(&mut tx, current.user_id).await?;
        }
        Reclassification::MarkAbsent => {
            records::upsert_missed_attendance(&mut tx, current.post_id, current.user_id).await?;
            users::increment_absences(&mut tx, current.user_id).await?;
        }
        Reclassification::FixFlag => {}
    }

    records::set_cancellation_flags(&mut tx, current.post_id, current.user_id, is_late, is_late)
        .await?;
    tx.commit().await?;
    Ok(())
}
