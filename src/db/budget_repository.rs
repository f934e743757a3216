use crate::db::executor::{Database, UpdateBuilder};
use crate::error::DbError;
use crate::models::budget::{Budget, BudgetPatch, BudgetSummary, NewBudget};
use crate::models::money::{from_hundredths, to_hundredths};
use rusqlite::{Row, params};

const BUDGET_COLUMNS: &str = "b.budget_id AS budget_id, b.user_id AS user_id,
     b.budget_name AS budget_name, b.budget_type AS budget_type,
     b.total_amount AS total_amount, b.start_date AS start_date, b.end_date AS end_date,
     b.is_active AS is_active, b.created_at AS created_at, b.updated_at AS updated_at";

fn map_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get("budget_id")?,
        user_id: row.get("user_id")?,
        name: row.get("budget_name")?,
        budget_type: row.get("budget_type")?,
        total_amount: from_hundredths(row.get("total_amount")?),
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn create(db: &Database, budget: &NewBudget) -> Result<i64, DbError> {
    let outcome = db.execute(
        "INSERT INTO budgets (user_id, budget_name, budget_type, total_amount,
                              start_date, end_date, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            budget.user_id,
            &budget.name,
            budget.budget_type,
            to_hundredths(budget.total_amount)?,
            budget.start_date,
            budget.end_date,
            budget.is_active,
        ],
    )?;
    Ok(outcome.last_insert_id)
}

pub fn get_by_id(db: &Database, budget_id: i64) -> Result<Option<Budget>, DbError> {
    db.fetch_optional(
        &format!("SELECT {} FROM budgets b WHERE b.budget_id = ?1", BUDGET_COLUMNS),
        [budget_id],
        map_budget,
    )
}

pub fn get_by_user(db: &Database, user_id: i64) -> Result<Vec<Budget>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM budgets b WHERE b.user_id = ?1
             ORDER BY b.created_at DESC, b.budget_id DESC",
            BUDGET_COLUMNS
        ),
        [user_id],
        map_budget,
    )
}

/// Active budgets, optionally restricted to one user.
pub fn get_active_budgets(db: &Database, user_id: Option<i64>) -> Result<Vec<Budget>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM budgets b
             WHERE b.is_active = 1 AND (?1 IS NULL OR b.user_id = ?1)
             ORDER BY b.created_at DESC, b.budget_id DESC",
            BUDGET_COLUMNS
        ),
        [user_id],
        map_budget,
    )
}

pub fn get_all(db: &Database) -> Result<Vec<Budget>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM budgets b ORDER BY b.created_at DESC, b.budget_id DESC",
            BUDGET_COLUMNS
        ),
        [],
        map_budget,
    )
}

pub fn update(db: &Database, budget_id: i64, patch: &BudgetPatch) -> Result<bool, DbError> {
    let total_amount = patch.total_amount.map(to_hundredths).transpose()?;

    let mut builder = UpdateBuilder::new("budgets", "budget_id").touch_updated_at();
    builder
        .set("budget_name", patch.name.as_deref())
        .set("budget_type", patch.budget_type)
        .set("total_amount", total_amount)
        .set("start_date", patch.start_date)
        .set("end_date", patch.end_date)
        .set("is_active", patch.is_active);
    builder.execute(db, budget_id)
}

/// Removes the budget and its rules.
pub fn delete(db: &Database, budget_id: i64) -> Result<bool, DbError> {
    let outcome = db.execute("DELETE FROM budgets WHERE budget_id = ?1", [budget_id])?;
    Ok(outcome.rows_affected > 0)
}

/// Soft delete: the budget stays but is no longer active.
pub fn deactivate(db: &Database, budget_id: i64) -> Result<bool, DbError> {
    let patch = BudgetPatch {
        is_active: Some(false),
        ..Default::default()
    };
    update(db, budget_id, &patch)
}

pub fn count(db: &Database) -> Result<i64, DbError> {
    db.fetch_one("SELECT COUNT(*) FROM budgets", [], |row| row.get(0))
}

pub fn get_budget_summary(db: &Database, budget_id: i64) -> Result<Option<BudgetSummary>, DbError> {
    db.fetch_optional(
        &format!(
            "SELECT {}, u.username AS username, u.email AS email,
                    COUNT(DISTINCT br.rule_id) AS rule_count
             FROM budgets b
             JOIN users u ON b.user_id = u.user_id
             LEFT JOIN budget_rules br ON b.budget_id = br.budget_id
             WHERE b.budget_id = ?1
             GROUP BY b.budget_id",
            BUDGET_COLUMNS
        ),
        [budget_id],
        |row| {
            Ok(BudgetSummary {
                budget: map_budget(row)?,
                username: row.get("username")?,
                email: row.get("email")?,
                rule_count: row.get("rule_count")?,
            })
        },
    )
}
