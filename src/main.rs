// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Triclub API Server
//!
//! Workout signups, waitlists and late-cancellation tracking for the club.

use triclub::{config::Config, db::Db, services::NotificationService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        timezone = %config.club_timezone,
        "Starting Triclub API"
    );

    let db = Db::connect(&config).await?;
    db.run_migrations().await?;
    db.verify_schema().await?;

    let notifier = NotificationService::new(config.notify_webhook_url.clone());
    if config.notify_webhook_url.is_none() {
        tracing::warn!("NOTIFY_WEBHOOK_URL not set; notifications will only be logged");
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config, db, notifier));

    let app = triclub::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triclub=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
