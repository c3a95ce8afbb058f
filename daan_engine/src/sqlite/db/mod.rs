//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or create an atomic transaction as the need arises and call
//! through to the functions without any other changes.
//!
//! Writes with a `RETURNING` clause are read with `fetch_all`. SQLite only ends the statement's implicit transaction
//! once every row has been stepped, and until then the write is invisible to the other connections in the pool.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod donations;
pub mod events;
pub mod favorites;
pub mod organizations;

const SQLITE_DB_URL: &str = "sqlite://data/daan_store.db";

pub fn db_url() -> String {
    let result = env::var("DAAN_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ DAAN_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub(crate) fn is_unique_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db) if db.is_unique_violation())
}
