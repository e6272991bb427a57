// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot recompute of late-cancellation flags and absence counts.
//!
//! Environment:
//! - `DATABASE_URL` (required)
//! - `CLUB_TIMEZONE` (default `America/Toronto`)
//! - `RECLASSIFY_DRY_RUN=1` to report without writing

use anyhow::Context;
use chrono_tz::Tz;
use sqlx::postgres::PgPoolOptions;
use std::env;
use triclub::config::DEFAULT_CLUB_TIMEZONE;
use triclub::db::Db;
use triclub::services::reclassify_cancellations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let tz: Tz = env::var("CLUB_TIMEZONE")
        .unwrap_or_else(|_| DEFAULT_CLUB_TIMEZONE.to_string())
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CLUB_TIMEZONE: {}", e))?;
    let dry_run = env::var("RECLASSIFY_DRY_RUN")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await
        .context("Cannot connect to database")?;
    let db = Db::from_pool(pool);
    db.verify_schema().await?;

    let report = reclassify_cancellations(&db, tz, dry_run).await?;
    println!(
        "reclassify{}: examined={}, unchanged={}, cleared={}, marked_absent={}, flags_fixed={}, unscheduled={}",
        if dry_run { " (dry run)" } else { "" },
        report.examined,
        report.unchanged,
        report.cleared,
        report.marked_absent,
        report.flags_fixed,
        report.unscheduled
    );
    Ok(())
}
