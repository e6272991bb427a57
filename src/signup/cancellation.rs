// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Late-cancellation classification.

use chrono::{DateTime, Utc};

/// Cancellations this close to the start (inclusive) are late.
pub const LATE_CANCELLATION_HOURS: f64 = 12.0;

/// How a cancellation is treated for absence tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_late: bool,
    /// Hours from `now` until the workout starts; negative once it has
    /// started, `None` when the start time is unknown.
    pub hours_until_start: Option<f64>,
}

/// Classify a cancellation made at `now` for a workout starting at `start`.
///
/// Late means `0 <= hours_until_start <= 12`. An unknown start is never late.
/// A cancellation after the start (negative hours) is not late either, so a
/// member who cancels once the workout is underway records no absence.
pub fn classify(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Classification {
    let Some(start) = start else {
        return Classification {
            is_late: false,
            hours_until_start: None,
        };
    };

    let hours = (start - now).num_milliseconds() as f64 / 3_600_000.0;

    Classification {
        is_late: (0.0..=LATE_CANCELLATION_HOURS).contains(&hours),
        hours_until_start: Some(hours),
    }
}
