use crate::db::executor::{Database, UpdateBuilder};
use crate::error::DbError;
use crate::models::money::{from_hundredths, to_hundredths};
use crate::models::rule::{
    BudgetRule, BudgetRulePatch, NewBudgetRule, RuleSpending, RuleWithCategory, percent_used,
};
use rusqlite::{Row, params};

const RULE_COLUMNS: &str = "br.rule_id AS rule_id, br.budget_id AS budget_id,
     br.category_id AS category_id, br.limit_amount AS limit_amount,
     br.alert_threshold AS alert_threshold, br.created_at AS created_at";

fn map_rule(row: &Row<'_>) -> rusqlite::Result<BudgetRule> {
    Ok(BudgetRule {
        id: row.get("rule_id")?,
        budget_id: row.get("budget_id")?,
        category_id: row.get("category_id")?,
        limit_amount: from_hundredths(row.get("limit_amount")?),
        alert_threshold: from_hundredths(row.get("alert_threshold")?),
        created_at: row.get("created_at")?,
    })
}

/// Fails with a constraint violation when the budget or category does not
/// exist, or when the budget already has a rule for the category.
pub fn create(db: &Database, rule: &NewBudgetRule) -> Result<i64, DbError> {
    let outcome = db.execute(
        "INSERT INTO budget_rules (budget_id, category_id, limit_amount, alert_threshold)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            rule.budget_id,
            rule.category_id,
            to_hundredths(rule.limit_amount)?,
            to_hundredths(rule.alert_threshold)?,
        ],
    )?;
    Ok(outcome.last_insert_id)
}

pub fn get_by_id(db: &Database, rule_id: i64) -> Result<Option<BudgetRule>, DbError> {
    db.fetch_optional(
        &format!("SELECT {} FROM budget_rules br WHERE br.rule_id = ?1", RULE_COLUMNS),
        [rule_id],
        map_rule,
    )
}

/// Rules of one budget with their category, by category name.
pub fn get_by_budget(db: &Database, budget_id: i64) -> Result<Vec<RuleWithCategory>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {}, c.category_name AS category_name, c.icon AS icon
             FROM budget_rules br
             JOIN categories c ON br.category_id = c.category_id
             WHERE br.budget_id = ?1
             ORDER BY c.category_name",
            RULE_COLUMNS
        ),
        [budget_id],
        |row| {
            Ok(RuleWithCategory {
                rule: map_rule(row)?,
                category_name: row.get("category_name")?,
                icon: row.get("icon")?,
            })
        },
    )
}

pub fn get_by_budget_and_category(
    db: &Database,
    budget_id: i64,
    category_id: i64,
) -> Result<Option<BudgetRule>, DbError> {
    db.fetch_optional(
        &format!(
            "SELECT {} FROM budget_rules br WHERE br.budget_id = ?1 AND br.category_id = ?2",
            RULE_COLUMNS
        ),
        [budget_id, category_id],
        map_rule,
    )
}

pub fn get_all(db: &Database) -> Result<Vec<BudgetRule>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {} FROM budget_rules br ORDER BY br.budget_id, br.category_id",
            RULE_COLUMNS
        ),
        [],
        map_rule,
    )
}

pub fn update(db: &Database, rule_id: i64, patch: &BudgetRulePatch) -> Result<bool, DbError> {
    let limit_amount = patch.limit_amount.map(to_hundredths).transpose()?;
    let alert_threshold = patch.alert_threshold.map(to_hundredths).transpose()?;

    let mut builder = UpdateBuilder::new("budget_rules", "rule_id");
    builder
        .set("limit_amount", limit_amount)
        .set("alert_threshold", alert_threshold);
    builder.execute(db, rule_id)
}

pub fn delete(db: &Database, rule_id: i64) -> Result<bool, DbError> {
    let outcome = db.execute("DELETE FROM budget_rules WHERE rule_id = ?1", [rule_id])?;
    Ok(outcome.rows_affected > 0)
}

/// Returns the number of rules removed.
pub fn delete_by_budget(db: &Database, budget_id: i64) -> Result<usize, DbError> {
    let outcome = db.execute("DELETE FROM budget_rules WHERE budget_id = ?1", [budget_id])?;
    Ok(outcome.rows_affected)
}

pub fn count(db: &Database) -> Result<i64, DbError> {
    db.fetch_one("SELECT COUNT(*) FROM budget_rules", [], |row| row.get(0))
}

/// Each rule of the budget with what its owner spent in the rule's category
/// between the budget's start and end dates (inclusive).
pub fn get_rules_with_spending(db: &Database, budget_id: i64) -> Result<Vec<RuleSpending>, DbError> {
    db.fetch_all(
        &format!(
            "SELECT {}, c.category_name AS category_name, c.icon AS icon,
                    COALESCE(SUM(t.amount), 0) AS total_spent,
                    br.limit_amount - COALESCE(SUM(t.amount), 0) AS remaining
             FROM budget_rules br
             JOIN categories c ON br.category_id = c.category_id
             JOIN budgets b ON br.budget_id = b.budget_id
             LEFT JOIN transactions t ON t.category_id = c.category_id
                 AND t.user_id = b.user_id
                 AND t.transaction_date BETWEEN b.start_date AND b.end_date
             WHERE br.budget_id = ?1
             GROUP BY br.rule_id
             ORDER BY c.category_name",
            RULE_COLUMNS
        ),
        [budget_id],
        |row| {
            let rule = map_rule(row)?;
            let total_spent = from_hundredths(row.get("total_spent")?);
            let remaining = from_hundredths(row.get("remaining")?);
            Ok(RuleSpending {
                percent_used: percent_used(total_spent, rule.limit_amount),
                category_name: row.get("category_name")?,
                icon: row.get("icon")?,
                total_spent,
                remaining,
                rule,
            })
        },
    )
}
