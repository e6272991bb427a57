// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout signup rules: capacity, late cancellations, waitlist promotion
//! and the per-user state machine. Nothing in here touches the database.

pub mod cancellation;
pub mod capacity;
pub mod machine;
pub mod promotion;

pub use cancellation::{classify, Classification, LATE_CANCELLATION_HOURS};
pub use capacity::{slots_freed, try_reserve_slot, SlotDecision};
pub use machine::{plan_toggle, SignupState, ToggleOutcome, ToggleStep};
pub use promotion::{action_for, PromotionAction, PromotionOutcome, VacancyReason};
