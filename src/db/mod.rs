// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (PostgreSQL via sqlx).
//!
//! Query functions take `&mut PgConnection` so the same code runs on a
//! pooled connection or inside a transaction (`&mut *tx`).

pub mod records;
pub mod roster;
pub mod users;
pub mod workouts;

use crate::config::Config;
use crate::error::{AppError, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

/// Newest migration this build knows how to talk to.
pub const EXPECTED_SCHEMA_VERSION: i64 = 1;

/// Shared handle to the connection pool. Cheap to clone.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Connect to PostgreSQL using the configured pool settings.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = pool_options(config)
            .connect(&config.database_url)
            .await?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Build a pool that only connects on first use.
    ///
    /// Router tests use this to exercise auth and validation without a
    /// running database; any query fails with a database error.
    pub fn connect_lazy(config: &Config) -> Result<Self> {
        let pool = pool_options(config).connect_lazy(&config.database_url)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations complete");
        Ok(())
    }

    /// Check once at startup that the schema is at least
    /// [`EXPECTED_SCHEMA_VERSION`]. Returns the applied version.
    pub async fn verify_schema(&self) -> Result<i64> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
                .fetch_one(&self.pool)
                .await?;
        let version = version.unwrap_or(0);

        if version < EXPECTED_SCHEMA_VERSION {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Database schema version {} is older than required {}",
                version,
                EXPECTED_SCHEMA_VERSION
            )));
        }

        tracing::info!(version, "Database schema verified");
        Ok(version)
    }
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
}
