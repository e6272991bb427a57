// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Triclub: workout signups for a triathlon club
//!
//! This crate provides the backend API for signing up to capacity-limited
//! club workouts, the FIFO waitlist behind them, and the late-cancellation
//! policy that counts absences.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod signup;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{NotificationService, SignupService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub notifier: NotificationService,
    pub signups: SignupService,
}

impl AppState {
    /// Wire the services over one pool and dispatcher.
    pub fn new(config: Config, db: Db, notifier: NotificationService) -> Self {
        let signups = SignupService::new(db.clone(), notifier.clone(), config.club_timezone);
        Self {
            config,
            db,
            notifier,
            signups,
        }
    }
}
