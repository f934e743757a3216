use crate::error::DbError;
use log::{debug, info, warn};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ToSql;
use rusqlite::{Params, Row};

pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Result of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub last_insert_id: i64,
    pub rows_affected: usize,
}

/// Handle to the connection pool. Every call runs exactly one statement in
/// its own transaction on a connection borrowed for the duration of the call.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<WriteOutcome, DbError> {
        self.in_transaction(sql, |tx| {
            let rows_affected = tx.execute(sql, params)?;
            Ok(WriteOutcome {
                last_insert_id: tx.last_insert_rowid(),
                rows_affected,
            })
        })
    }

    pub fn fetch_all<T, P, F>(&self, sql: &str, params: P, map_row: F) -> Result<Vec<T>, DbError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.in_transaction(sql, |tx| {
            let mut stmt = tx.prepare(sql)?;
            let rows = stmt
                .query_map(params, map_row)?
                .collect::<rusqlite::Result<Vec<T>>>()?;
            Ok(rows)
        })
    }

    pub fn fetch_optional<T, P, F>(
        &self,
        sql: &str,
        params: P,
        map_row: F,
    ) -> Result<Option<T>, DbError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.in_transaction(sql, |tx| {
            let mut stmt = tx.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            match rows.next()? {
                Some(row) => Ok(Some(map_row(row)?)),
                None => Ok(None),
            }
        })
    }

    pub fn fetch_one<T, P, F>(&self, sql: &str, params: P, map_row: F) -> Result<T, DbError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.in_transaction(sql, |tx| tx.query_row(sql, params, map_row))
    }

    /// Closes every idle connection. Connections still checked out are
    /// closed when they are returned.
    pub fn shutdown(self) {
        let state = self.pool.state();
        info!(
            "Closing connection pool ({} connections, {} idle)",
            state.connections, state.idle_connections
        );
        drop(self.pool);
    }

    fn in_transaction<T, F>(&self, sql: &str, statement: F) -> Result<T, DbError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T>,
    {
        debug!("Executing: {}", sql.split_whitespace().collect::<Vec<_>>().join(" "));
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        match statement(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                warn!("Statement failed, rolling back: {}", e);
                if let Err(rollback_error) = tx.rollback() {
                    warn!("Rollback failed: {}", rollback_error);
                }
                Err(e.into())
            }
        }
    }
}

/// Assembles `UPDATE <table> SET ... WHERE <key> = ?` from column names that
/// come from repository code only. Values are always bound parameters.
pub struct UpdateBuilder<'a> {
    table: &'static str,
    key_column: &'static str,
    touches_updated_at: bool,
    assignments: Vec<&'static str>,
    values: Vec<Box<dyn ToSql + 'a>>,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            key_column,
            touches_updated_at: false,
            assignments: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn touch_updated_at(mut self) -> Self {
        self.touches_updated_at = true;
        self
    }

    pub fn set<V: ToSql + 'a>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.assignments.push(column);
            self.values.push(Box::new(value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn sql(&self) -> String {
        let mut sets: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(idx, column)| format!("{} = ?{}", column, idx + 1))
            .collect();
        if self.touches_updated_at {
            sets.push("updated_at = CURRENT_TIMESTAMP".to_string());
        }
        format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.table,
            sets.join(", "),
            self.key_column,
            self.assignments.len() + 1
        )
    }

    /// Runs the update for the row with the given key. Returns `Ok(false)`
    /// without touching the database when no column was set.
    pub fn execute(self, db: &Database, key: i64) -> Result<bool, DbError> {
        if self.is_empty() {
            return Ok(false);
        }
        let sql = self.sql();
        let mut params: Vec<&dyn ToSql> = self.values.iter().map(|v| v.as_ref()).collect();
        params.push(&key);
        let outcome = db.execute(&sql, params.as_slice())?;
        Ok(outcome.rows_affected > 0)
    }
}
