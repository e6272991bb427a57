// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Capacity gate: decides whether a workout has room for one more signup.

/// Outcome of asking the gate for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDecision {
    Reserved,
    Full,
}

/// Decide whether a new signup may proceed.
///
/// `capacity == None` means unlimited. The database insert repeats this
/// comparison in its `WHERE` clause so the decision and the write are one
/// statement.
pub fn try_reserve_slot(capacity: Option<i32>, current_signups: i64) -> SlotDecision {
    match capacity {
        None => SlotDecision::Reserved,
        Some(cap) if current_signups < i64::from(cap) => SlotDecision::Reserved,
        Some(_) => SlotDecision::Full,
    }
}

/// Number of waitlisted users that may be released after a capacity edit.
///
/// `None` means every waitlisted user fits.
pub fn slots_freed(new_capacity: Option<i32>, current_signups: i64) -> Option<u64> {
    new_capacity.map(|cap| (i64::from(cap) - current_signups).max(0) as u64)
}

/// Whether an edit from `old` to `new` capacity can open slots.
pub fn is_capacity_increase(old: Option<i32>, new: Option<i32>) -> bool {
    match (old, new) {
        (Some(_), None) => true,
        (Some(old), Some(new)) => new > old,
        (None, _) => false,
    }
}
