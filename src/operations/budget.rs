use super::{OperationError, format_money, parse_id, title};
use crate::db::{Database, budget_repository, rule_repository};
use crate::models::budget::BudgetSummary;
use crate::models::rule::RuleSpending;
use rust_decimal::Decimal;

pub fn view_budget_details(db: &Database, budget_input: &str) -> Result<String, OperationError> {
    let budget_id = parse_id(budget_input, "budget")?;
    let summary = budget_repository::get_budget_summary(db, budget_id)?
        .ok_or_else(|| OperationError::NotFound(format!("Budget with ID {}", budget_id)))?;
    Ok(render_budget_details(&summary))
}

pub fn view_rules_with_spending(db: &Database, budget_input: &str) -> Result<String, OperationError> {
    let budget_id = parse_id(budget_input, "budget")?;
    let budget = budget_repository::get_by_id(db, budget_id)?
        .ok_or_else(|| OperationError::NotFound(format!("Budget with ID {}", budget_id)))?;
    let rules = rule_repository::get_rules_with_spending(db, budget_id)?;
    Ok(render_rules_with_spending(&budget.name, &rules))
}

fn render_budget_details(summary: &BudgetSummary) -> String {
    let budget = &summary.budget;
    let mut out = title("BUDGET DETAILS");
    out.push_str(&format!("\nBudget ID: {}\n", budget.id));
    out.push_str(&format!("Budget Name: {}\n", budget.name));
    out.push_str(&format!("Budget Type: {}\n", budget.budget_type));
    out.push_str(&format!("Total Amount: {}\n", format_money(budget.total_amount)));
    out.push_str(&format!("Period: {} to {}\n", budget.start_date, budget.end_date));
    out.push_str(&format!("Active: {}\n", if budget.is_active { "Yes" } else { "No" }));
    out.push_str(&format!("\nOwner: {} ({})\n", summary.username, summary.email));
    out.push_str(&format!("Number of Rules: {}\n", summary.rule_count));
    out
}

fn format_percent(percent: Option<Decimal>) -> String {
    match percent {
        Some(value) => format!("{:.1}%", value.round_dp(1)),
        None => "n/a".to_string(),
    }
}

fn render_rules_with_spending(budget_name: &str, rules: &[RuleSpending]) -> String {
    let mut out = title(&format!("BUDGET RULES AND SPENDING\nBudget: {}", budget_name));
    if rules.is_empty() {
        out.push_str("No rules found for this budget.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<15} {:<12} {:<12} {:<12} {:<10}\n",
        "Category", "Limit", "Spent", "Remaining", "% Used"
    ));
    out.push_str(&format!("{}\n", "-".repeat(70)));
    for rule in rules {
        out.push_str(&format!(
            "{:<15} {:<12} {:<12} {:<12} {:<10}\n",
            rule.category_name,
            format_money(rule.rule.limit_amount),
            format_money(rule.total_spent),
            format_money(rule.remaining),
            format_percent(rule.percent_used)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{date, establish_test_database};
    use crate::db::{category_repository, transaction_repository, user_repository};
    use crate::models::budget::{BudgetType, NewBudget};
    use crate::models::rule::NewBudgetRule;
    use crate::models::transaction::NewTransaction;

    fn setup(db: &Database) -> (i64, i64, i64) {
        let user = user_repository::create(db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(db, "Food", "", "🍔").unwrap();
        let budget = budget_repository::create(
            db,
            &NewBudget {
                user_id: user,
                name: "January".to_string(),
                budget_type: BudgetType::Moderate,
                total_amount: Decimal::from(500),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 31),
                is_active: true,
            },
        )
        .unwrap();
        (user, food, budget)
    }

    #[test]
    fn test_budget_details() {
        let (db, _dir) = establish_test_database().unwrap();
        let (_, food, budget) = setup(&db);
        rule_repository::create(&db, &NewBudgetRule::new(budget, food, Decimal::from(200)))
            .unwrap();

        let out = view_budget_details(&db, &budget.to_string()).unwrap();
        assert!(out.contains("Budget Name: January"));
        assert!(out.contains("Budget Type: moderate"));
        assert!(out.contains("Total Amount: $500.00"));
        assert!(out.contains("Period: 2024-01-01 to 2024-01-31"));
        assert!(out.contains("Owner: alice (a@x.com)"));
        assert!(out.contains("Number of Rules: 1"));
    }

    #[test]
    fn test_budget_details_invalid_and_missing() {
        let (db, _dir) = establish_test_database().unwrap();
        let invalid = view_budget_details(&db, "x1").unwrap_err();
        assert_eq!(invalid.to_string(), "Invalid budget ID.");

        let missing = view_budget_details(&db, "77").unwrap_err();
        assert_eq!(missing.to_string(), "Budget with ID 77 not found.");
    }

    #[test]
    fn test_rules_with_spending_table() {
        let (db, _dir) = establish_test_database().unwrap();
        let (user, food, budget) = setup(&db);
        rule_repository::create(&db, &NewBudgetRule::new(budget, food, Decimal::from(200)))
            .unwrap();
        for cents in [5000, 3000] {
            transaction_repository::create(
                &db,
                &NewTransaction::new(
                    user,
                    food,
                    Decimal::new(cents, 2),
                    date(2024, 1, 10),
                ),
            )
            .unwrap();
        }

        let out = view_rules_with_spending(&db, &budget.to_string()).unwrap();
        assert!(out.contains("Budget: January"));
        assert!(out.contains("$200.00"));
        assert!(out.contains("$80.00"));
        assert!(out.contains("$120.00"));
        assert!(out.contains("40.0%"));
    }

    #[test]
    fn test_rules_with_spending_without_rules() {
        let (db, _dir) = establish_test_database().unwrap();
        let (_, _, budget) = setup(&db);
        let out = view_rules_with_spending(&db, &budget.to_string()).unwrap();
        assert!(out.contains("No rules found for this budget."));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(Decimal::new(33333, 3))), "33.3%");
        assert_eq!(format_percent(None), "n/a");
    }
}
