// file: src/database/mod.rs

use anyhow::{Context, Result};
use log::{debug, info};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
    Sqlite,
};
use std::path::Path;

pub mod kv;

/// Storage key of the serialized session.
pub const SESSION_KEY: &str = "user";
/// Storage key of the pending connect request.
pub const PENDING_CONNECT_KEY: &str = "pending_connect";

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        // Create database if it doesn't exist
        let db_exists = Sqlite::database_exists(&db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating database at {}", path.display());
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        let pool = SqlitePool::connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        run_schema(&pool).await.context("Failed to run database schema")?;

        info!("Database initialized successfully");

        Ok(Database { pool })
    }

    /// Private database that disappears with the process.
    pub async fn in_memory() -> Result<Self> {
        // A single connection, otherwise every pooled connection gets its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        run_schema(&pool).await.context("Failed to run database schema")?;

        Ok(Database { pool })
    }

    // --- Key/value Delegates ---

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        kv::get(&self.pool, key).await
    }

    pub async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        debug!("Storing key '{}'", key);
        kv::put(&self.pool, key, value).await
    }

    pub async fn remove_value(&self, key: &str) -> Result<bool> {
        debug!("Removing key '{}'", key);
        kv::remove(&self.pool, key).await
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();

    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            sqlx::query(&current_statement).execute(pool).await?;
            current_statement.clear();
        }
    }
    Ok(())
}
