//! # SQLite Database methods
//!
//! Low-level SQLite interactions, as plain functions that accept a `&mut SqliteConnection`. A caller can pass a pooled
//! connection, or `&mut *tx` from an open transaction to make several calls atomic, without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod carts;
pub mod notifications;
pub mod payment_events;
pub mod products;
pub mod transactions;

const SQLITE_DB_URL: &str = "sqlite://data/grounds_market.db";

pub fn db_url() -> String {
    let result = env::var("GM_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ GM_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
