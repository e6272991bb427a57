// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod roster;
pub mod user;
pub mod workout;

pub use roster::{AttendanceRecord, CancellationRecord, Signup, WaitlistEntry};
pub use user::{Role, User};
pub use workout::Workout;
