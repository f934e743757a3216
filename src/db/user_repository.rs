use crate::db::executor::{Database, UpdateBuilder};
use crate::error::DbError;
use crate::models::user::{User, UserPatch};
use rusqlite::Row;

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, created_at, updated_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("user_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn create(db: &Database, username: &str, email: &str, password_hash: &str) -> Result<i64, DbError> {
    let outcome = db.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
        [username, email, password_hash],
    )?;
    Ok(outcome.last_insert_id)
}

pub fn get_by_id(db: &Database, user_id: i64) -> Result<Option<User>, DbError> {
    db.fetch_optional(
        &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
        [user_id],
        map_user,
    )
}

pub fn get_by_username(db: &Database, username: &str) -> Result<Option<User>, DbError> {
    db.fetch_optional(
        &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
        [username],
        map_user,
    )
}

pub fn get_by_email(db: &Database, email: &str) -> Result<Option<User>, DbError> {
    db.fetch_optional(
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
        [email],
        map_user,
    )
}

/// Newest users first.
pub fn get_all(db: &Database) -> Result<Vec<User>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM users ORDER BY created_at DESC, user_id DESC",
            USER_COLUMNS
        ),
        [],
        map_user,
    )
}

pub fn update(db: &Database, user_id: i64, patch: &UserPatch) -> Result<bool, DbError> {
    let mut builder = UpdateBuilder::new("users", "user_id").touch_updated_at();
    builder
        .set("username", patch.username.as_deref())
        .set("email", patch.email.as_deref())
        .set("password_hash", patch.password_hash.as_deref());
    builder.execute(db, user_id)
}

/// Removes the user together with its budgets, their rules and its
/// transactions.
pub fn delete(db: &Database, user_id: i64) -> Result<bool, DbError> {
    let outcome = db.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
    Ok(outcome.rows_affected > 0)
}

pub fn count(db: &Database) -> Result<i64, DbError> {
    db.fetch_one("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}
