// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod notify;
pub mod promoter;
pub mod reclassify;
pub mod signup;

pub use notify::{Notification, NotificationKind, NotificationService};
pub use promoter::WaitlistPromoter;
pub use reclassify::{reclassify_cancellations, ReclassifyReport};
pub use signup::{AttendanceMark, SignupService, WorkoutRoster, WorkoutUpdate};
