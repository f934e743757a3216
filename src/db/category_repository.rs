use crate::db::executor::{Database, UpdateBuilder};
use crate::error::DbError;
use crate::models::category::{Category, CategoryPatch, CategoryWithCount};
use rusqlite::Row;

const CATEGORY_COLUMNS: &str = "c.category_id AS category_id, c.category_name AS category_name,
     c.description AS description, c.icon AS icon, c.created_at AS created_at";

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("category_id")?,
        name: row.get("category_name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        created_at: row.get("created_at")?,
    })
}

pub fn create(db: &Database, name: &str, description: &str, icon: &str) -> Result<i64, DbError> {
    let outcome = db.execute(
        "INSERT INTO categories (category_name, description, icon) VALUES (?1, ?2, ?3)",
        [name, description, icon],
    )?;
    Ok(outcome.last_insert_id)
}

pub fn get_by_id(db: &Database, category_id: i64) -> Result<Option<Category>, DbError> {
    db.fetch_optional(
        &format!(
            "SELECT {} FROM categories c WHERE c.category_id = ?1",
            CATEGORY_COLUMNS
        ),
        [category_id],
        map_category,
    )
}

pub fn get_by_name(db: &Database, name: &str) -> Result<Option<Category>, DbError> {
    db.fetch_optional(
        &format!(
            "SELECT {} FROM categories c WHERE c.category_name = ?1",
            CATEGORY_COLUMNS
        ),
        [name],
        map_category,
    )
}

pub fn get_all(db: &Database) -> Result<Vec<Category>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM categories c ORDER BY c.category_name",
            CATEGORY_COLUMNS
        ),
        [],
        map_category,
    )
}

/// Every category, including unused ones, with the number of transactions
/// filed under it.
pub fn get_with_transaction_count(db: &Database) -> Result<Vec<CategoryWithCount>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {}, COUNT(t.transaction_id) AS transaction_count
             FROM categories c
             LEFT JOIN transactions t ON c.category_id = t.category_id
             GROUP BY c.category_id
             ORDER BY c.category_name",
            CATEGORY_COLUMNS
        ),
        [],
        |row| {
            Ok(CategoryWithCount {
                category: map_category(row)?,
                transaction_count: row.get("transaction_count")?,
            })
        },
    )
}

pub fn update(db: &Database, category_id: i64, patch: &CategoryPatch) -> Result<bool, DbError> {
    let mut builder = UpdateBuilder::new("categories", "category_id");
    builder
        .set("category_name", patch.name.as_deref())
        .set("description", patch.description.as_deref())
        .set("icon", patch.icon.as_deref());
    builder.execute(db, category_id)
}

/// Fails with a constraint violation while any transaction or budget rule
/// still references the category.
pub fn delete(db: &Database, category_id: i64) -> Result<bool, DbError> {
    let outcome = db.execute(
        "DELETE FROM categories WHERE category_id = ?1",
        [category_id],
    )?;
    Ok(outcome.rows_affected > 0)
}

pub fn count(db: &Database) -> Result<i64, DbError> {
    db.fetch_one("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
}
