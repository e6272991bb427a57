// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-(workout, user) signup state and the transitions between states.
//!
//! ```text
//! NotSignedUp --reserve--> SignedUp --cancel--> NotSignedUp
//! NotSignedUp --full-----> Waitlisted --promote/reserve--> SignedUp
//! Waitlisted  --withdraw-> NotSignedUp
//! ```

use crate::error::{AppError, Result};
use crate::signup::capacity::SlotDecision;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where a user stands for one workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SignupState {
    NotSignedUp,
    SignedUp,
    Waitlisted,
}

impl SignupState {
    /// Build the state from the two membership rows.
    ///
    /// Holding both a signup and a waitlist entry is an invariant violation.
    pub fn from_rows(signed_up: bool, waitlisted: bool) -> Result<Self> {
        match (signed_up, waitlisted) {
            (false, false) => Ok(SignupState::NotSignedUp),
            (true, false) => Ok(SignupState::SignedUp),
            (false, true) => Ok(SignupState::Waitlisted),
            (true, true) => Err(AppError::Internal(anyhow::anyhow!(
                "user is both signed up and waitlisted"
            ))),
        }
    }
}

/// Step chosen by the toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    /// Signed up: cancel and classify.
    Cancel,
    /// Room available: take the slot (dropping any waitlist entry).
    Reserve,
    /// Full: join the waitlist.
    JoinWaitlist,
    /// Full and already waitlisted: nothing to write.
    StayWaitlisted,
}

/// Pick the toggle step. `gate` is only consulted when not signed up.
pub fn plan_toggle(state: SignupState, gate: SlotDecision) -> ToggleStep {
    match (state, gate) {
        (SignupState::SignedUp, _) => ToggleStep::Cancel,
        (_, SlotDecision::Reserved) => ToggleStep::Reserve,
        (SignupState::NotSignedUp, SlotDecision::Full) => ToggleStep::JoinWaitlist,
        (SignupState::Waitlisted, SlotDecision::Full) => ToggleStep::StayWaitlisted,
    }
}

/// Validate an explicit waitlist join.
pub fn check_join_waitlist(state: SignupState, gate: SlotDecision) -> Result<()> {
    match (state, gate) {
        (SignupState::SignedUp, _) => Err(AppError::BadRequest(
            "Already signed up for this workout".to_string(),
        )),
        (SignupState::Waitlisted, _) => Err(AppError::BadRequest(
            "Already on the waitlist for this workout".to_string(),
        )),
        (SignupState::NotSignedUp, SlotDecision::Reserved) => Err(AppError::BadRequest(
            "Workout has open spots; sign up instead".to_string(),
        )),
        (SignupState::NotSignedUp, SlotDecision::Full) => Ok(()),
    }
}

/// Result of a toggle, serialized as the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleOutcome {
    pub signed_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_12hrs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_absent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_waitlist: Option<bool>,
}

impl ToggleOutcome {
    pub fn signed_up() -> Self {
        Self {
            signed_up: true,
            within_12hrs: None,
            marked_absent: None,
            joined_waitlist: None,
        }
    }

    pub fn waitlisted() -> Self {
        Self {
            signed_up: false,
            within_12hrs: None,
            marked_absent: None,
            joined_waitlist: Some(true),
        }
    }

    pub fn cancelled(is_late: bool) -> Self {
        Self {
            signed_up: false,
            within_12hrs: Some(is_late),
            marked_absent: Some(is_late),
            joined_waitlist: None,
        }
    }
}
