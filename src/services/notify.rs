// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-commit member notifications.
//!
//! Delivery goes to an external notification service (email/SMS/push) over
//! HTTP. Everything here is best-effort: callers hand notifications over
//! after their transaction commits and never see delivery failures.

use crate::error::{AppError, Result};
use crate::models::Workout;
use chrono::{NaiveDate, NaiveTime};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MAX_CONCURRENT_SENDS: usize = 8;
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// What the member is being told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Moved from the waitlist into a signup.
    WaitlistPromotion,
    /// A late cancellation opened a spot; the member has to sign up themselves.
    LastMinuteOpportunity,
}

/// Payload posted to the notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub user_id: i64,
    pub workout_id: i64,
    pub workout_title: String,
    pub workout_date: Option<NaiveDate>,
    pub workout_time: Option<NaiveTime>,
}

impl Notification {
    fn for_workout(kind: NotificationKind, user_id: i64, workout: &Workout) -> Self {
        Self {
            kind,
            user_id,
            workout_id: workout.id,
            workout_title: workout.title.clone(),
            workout_date: workout.workout_date,
            workout_time: workout.workout_time,
        }
    }

    pub fn waitlist_promotion(user_id: i64, workout: &Workout) -> Self {
        Self::for_workout(NotificationKind::WaitlistPromotion, user_id, workout)
    }

    pub fn last_minute_opportunity(user_id: i64, workout: &Workout) -> Self {
        Self::for_workout(NotificationKind::LastMinuteOpportunity, user_id, workout)
    }
}

/// Notification dispatcher.
#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    webhook_url: Option<String>,
    /// In-memory copy of every dispatched notification (tests only).
    recorded: Option<Arc<Mutex<Vec<Notification>>>>,
}

impl NotificationService {
    /// Create a dispatcher. Without a webhook URL notifications are only logged.
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build notification client, using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            webhook_url,
            recorded: None,
        }
    }

    /// Dispatcher that keeps every dispatched notification for inspection.
    pub fn recording() -> Self {
        Self {
            recorded: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::new(None)
        }
    }

    /// Notifications dispatched so far (empty unless built with [`Self::recording`]).
    pub fn recorded(&self) -> Vec<Notification> {
        self.recorded
            .as_ref()
            .and_then(|r| r.lock().ok().map(|guard| guard.clone()))
            .unwrap_or_default()
    }

    /// Send notifications in the background. Failures are logged and dropped.
    ///
    /// Call only after the transaction that produced them has committed.
    pub fn dispatch(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }

        if let Some(recorded) = &self.recorded {
            if let Ok(mut guard) = recorded.lock() {
                guard.extend(notifications.iter().cloned());
            }
        }

        let service = self.clone();
        tokio::spawn(async move {
            let failed = service.deliver_all(notifications).await;
            if failed > 0 {
                tracing::warn!(failed, "Some notifications could not be delivered");
            }
        });
    }

    /// Deliver notifications concurrently. Returns the number that failed.
    pub async fn deliver_all(&self, notifications: Vec<Notification>) -> usize {
        stream::iter(notifications)
            .map(|notification| async move {
                let result = self.send(&notification).await;
                if let Err(e) = &result {
                    tracing::warn!(
                        error = %e,
                        user_id = notification.user_id,
                        workout_id = notification.workout_id,
                        kind = ?notification.kind,
                        "Notification delivery failed"
                    );
                }
                result
            })
            .buffer_unordered(MAX_CONCURRENT_SENDS)
            .filter(|result| std::future::ready(result.is_err()))
            .count()
            .await
    }

    /// Deliver a single notification.
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(
                user_id = notification.user_id,
                workout_id = notification.workout_id,
                kind = ?notification.kind,
                "Notification (no webhook configured)"
            );
            return Ok(());
        };

        self.client
            .post(url)
            .json(notification)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Notification(e.to_string()))?;

        tracing::debug!(
            user_id = notification.user_id,
            workout_id = notification.workout_id,
            kind = ?notification.kind,
            "Notification delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workout() -> Workout {
        Workout {
            id: 7,
            author_id: 1,
            title: "Tuesday swim".to_string(),
            body: String::new(),
            workout_type: Some("swim".to_string()),
            workout_date: NaiveDate::from_ymd_opt(2024, 7, 2),
            workout_time: NaiveTime::from_hms_opt(6, 30, 0),
            capacity: Some(12),
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_notification_payload_shape() {
        let n = Notification::last_minute_opportunity(42, &workout());
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["kind"], "last_minute_opportunity");
        assert_eq!(json["user_id"], 42);
        assert_eq!(json["workout_id"], 7);
        assert_eq!(json["workout_date"], "2024-07-02");
        assert_eq!(json["workout_time"], "06:30:00");
    }

    #[tokio::test]
    async fn test_recording_dispatch_keeps_copies() {
        let service = NotificationService::recording();
        service.dispatch(vec![
            Notification::waitlist_promotion(1, &workout()),
            Notification::waitlist_promotion(2, &workout()),
        ]);

        let recorded = service.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].kind, NotificationKind::WaitlistPromotion);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_failures_are_counted_not_raised() {
        let service = NotificationService::new(Some("http://127.0.0.1:9/notify".to_string()));
        let failed = service
            .deliver_all(vec![Notification::waitlist_promotion(1, &workout())])
            .await;
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_without_webhook_send_succeeds() {
        let service = NotificationService::new(None);
        assert!(service
            .send(&Notification::waitlist_promotion(1, &workout()))
            .await
            .is_ok());
    }
}
