// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! What happens to the head of the waitlist when a slot opens.

use crate::models::WaitlistEntry;

/// Why a slot became available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacancyReason {
    NormalCancellation,
    LateCancellation,
    CapacityIncrease,
}

impl VacancyReason {
    /// Reason for a vacancy left by a cancellation.
    pub fn from_cancellation(is_late: bool) -> Self {
        if is_late {
            VacancyReason::LateCancellation
        } else {
            VacancyReason::NormalCancellation
        }
    }
}

/// Action taken on the head-of-waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionAction {
    /// Move the entry into a signup.
    Promote,
    /// Leave the entry in place and tell the user a spot opened.
    Offer,
}

/// Decide the action for a vacancy.
///
/// A late cancellation is not a guaranteed opening, so the head of the
/// waitlist keeps their position and is only told about it.
pub fn action_for(reason: VacancyReason) -> PromotionAction {
    match reason {
        VacancyReason::NormalCancellation | VacancyReason::CapacityIncrease => {
            PromotionAction::Promote
        }
        VacancyReason::LateCancellation => PromotionAction::Offer,
    }
}

/// Result of resolving one vacancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    Promoted(WaitlistEntry),
    Offered(WaitlistEntry),
    NoOne,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cancellation_promotes() {
        assert_eq!(
            action_for(VacancyReason::from_cancellation(false)),
            PromotionAction::Promote
        );
    }

    #[test]
    fn test_late_cancellation_only_offers() {
        assert_eq!(
            action_for(VacancyReason::from_cancellation(true)),
            PromotionAction::Offer
        );
    }

    #[test]
    fn test_capacity_increase_promotes() {
        assert_eq!(
            action_for(VacancyReason::CapacityIncrease),
            PromotionAction::Promote
        );
    }
}
