//! Database migrations
//!
//! SQL files under `migrations/` are embedded at compile time and applied in
//! version order on startup. Applied versions are recorded in
//! `schema_history`; each migration runs in its own transaction.

use anyhow::Context;

use crate::{dao::PoolType, error::Error};

pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users",
        sql: include_str!("../migrations/V001__users.sql"),
    },
    Migration {
        version: 2,
        name: "session",
        sql: include_str!("../migrations/V002__session.sql"),
    },
    Migration {
        version: 3,
        name: "push_subscription",
        sql: include_str!("../migrations/V003__push_subscription.sql"),
    },
];

pub async fn run_migrations(pool: &PoolType) -> Result<(), Error> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS "schema_history" (
            "version" INTEGER PRIMARY KEY,
            "name" TEXT NOT NULL,
            "applied_at" TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<(i32,)> =
        sqlx::query_as(r#"SELECT "version" FROM "schema_history""#)
            .fetch_all(pool)
            .await?;
    let applied: Vec<i32> = applied.into_iter().map(|(v,)| v).collect();

    let mut count = 0;
    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "Migration V{:03}__{} failed",
                    migration.version, migration.name
                )
            })?;
        sqlx::query(
            r#"INSERT INTO "schema_history" ("version", "name") VALUES ($1, $2)"#,
        )
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            "Applied migration: V{:03}__{}",
            migration.version,
            migration.name
        );
        count += 1;
    }

    if count == 0 {
        tracing::info!("No new migrations to apply");
    } else {
        tracing::info!("Successfully applied {} migration(s)", count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_have_ascending_versions() {
        assert!(!MIGRATIONS.is_empty(), "No migrations found");

        let mut prev_version = 0;
        for migration in MIGRATIONS {
            assert!(
                migration.version > prev_version,
                "Migrations must have unique ascending version numbers"
            );
            assert!(!migration.sql.trim().is_empty());
            prev_version = migration.version;
        }
    }

    #[test]
    fn subscriptions_cascade_with_their_user() {
        let sql = MIGRATIONS
            .iter()
            .find(|m| m.name == "push_subscription")
            .map(|m| m.sql)
            .unwrap();
        assert!(sql.contains(r#"REFERENCES "users"("id") ON DELETE CASCADE"#));
    }
}
