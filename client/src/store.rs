//! Durable credential storage
//!
//! Three independently keyed string slots back the session store: the raw
//! bearer token, the serialized user record and the serialized subscription
//! snapshot. Nothing else in the client writes here. Login fills all three
//! slots, logout clears all three; anything in between is treated with
//! suspicion by hydration.

use std::path::PathBuf;

use color_eyre::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use crate::config;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid SQLite path: {path}")]
    InvalidSqLitePath { path: PathBuf },
}

/// Storage slot keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Token,
    User,
    Subscription,
}

impl Slot {
    fn key(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::User => "user",
            Self::Subscription => "subscription",
        }
    }
}

/// SQLite backed slot storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    db: sqlx::SqlitePool,
}

impl CredentialStore {
    /// Storage for testing purposes - in-memory SQLite database
    pub async fn test() -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true)
            .shared_cache(true);

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(opts);

        sqlx::migrate!("./migrations").run(&db).await?;

        Ok(Self { db })
    }

    /// Storage from configuration
    pub async fn with_config(config: &config::Database) -> Result<Self> {
        let db = match config {
            config::Database::Memory => {
                let opts = SqliteConnectOptions::new()
                    .filename(":memory:")
                    .create_if_missing(true)
                    .shared_cache(true);

                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_lazy_with(opts)
            }

            config::Database::SqLite { path } => {
                let path = path
                    .as_path()
                    .to_str()
                    .ok_or_else(|| Error::InvalidSqLitePath { path: path.clone() })?;

                let opts = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);

                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_lazy_with(opts)
            }
        };

        sqlx::migrate!("./migrations").run(&db).await?;

        Ok(Self { db })
    }

    /// Reads a slot, `None` when it was never written or has been cleared
    pub async fn get(&self, slot: Slot) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("select value from credentials where slot = ?")
                .bind(slot.key())
                .fetch_optional(&self.db)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Writes a slot, replacing any previous value
    pub async fn put(&self, slot: Slot, value: &str) -> Result<()> {
        sqlx::query(
            "insert into credentials (slot, value) values (?, ?) \
             on conflict(slot) do update set value = excluded.value",
        )
        .bind(slot.key())
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Clears a single slot; clearing an absent slot is a no-op
    pub async fn remove(&self, slot: Slot) -> Result<()> {
        sqlx::query("delete from credentials where slot = ?")
            .bind(slot.key())
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Clears every slot in one statement, so a reader never observes a
    /// partially cleared store
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("delete from credentials").execute(&self.db).await?;
        Ok(())
    }
}
