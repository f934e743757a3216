use crate::config::DatabaseConfig;
use crate::db::executor::Database;
use crate::error::DbError;
use log::{debug, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS budgets (
    budget_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
    budget_name TEXT NOT NULL,
    budget_type TEXT NOT NULL,
    total_amount INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS budget_rules (
    rule_id INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_id INTEGER NOT NULL REFERENCES budgets (budget_id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories (category_id) ON DELETE RESTRICT,
    limit_amount INTEGER NOT NULL,
    alert_threshold INTEGER NOT NULL DEFAULT 8000,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (budget_id, category_id)
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories (category_id) ON DELETE RESTRICT,
    amount INTEGER NOT NULL,
    transaction_date TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    payment_method TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_budgets_user ON budgets (user_id);
CREATE INDEX IF NOT EXISTS idx_budget_rules_category ON budget_rules (category_id);
CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions (user_id, transaction_date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions (category_id);
";

pub fn establish_database(config: &DatabaseConfig) -> Result<Database, DbError> {
    info!(
        "Opening {} with a pool of {} connections",
        config.database_file.display(),
        config.pool_size
    );
    open_pool(&config.database_file, config.pool_size)
}

fn open_pool(path: &Path, pool_size: u32) -> Result<Database, DbError> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    let pool = Pool::builder().max_size(pool_size).build(manager)?;

    {
        let conn = pool.get()?;
        conn.execute_batch(SCHEMA)?;
        debug!("Schema ready");
    }

    Ok(Database::new(pool))
}

/// Opens a fresh database in a temporary directory. The directory must be
/// kept alive for as long as the database is used.
#[cfg(test)]
pub fn establish_test_database() -> Result<(Database, tempfile::TempDir), DbError> {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let db = open_pool(&dir.path().join("budget_tracker_test.db"), 2)?;
    Ok((db, dir))
}

#[cfg(test)]
pub fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).expect("Invalid test date")
}

#[cfg(test)]
pub fn amount(value: &str) -> rust_decimal::Decimal {
    value.parse().expect("Invalid test amount")
}
