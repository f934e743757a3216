use super::{OperationError, title};
use crate::db::{
    Database, budget_repository, category_repository, rule_repository, transaction_repository,
    user_repository,
};

pub fn show_statistics(db: &Database) -> Result<String, OperationError> {
    let mut out = title("DATABASE STATISTICS");
    out.push_str(&format!("\nTotal Users: {}\n", user_repository::count(db)?));
    out.push_str(&format!("Total Categories: {}\n", category_repository::count(db)?));
    out.push_str(&format!("Total Budgets: {}\n", budget_repository::count(db)?));
    out.push_str(&format!("Total Budget Rules: {}\n", rule_repository::count(db)?));
    out.push_str(&format!("Total Transactions: {}\n", transaction_repository::count(db)?));

    let active = budget_repository::get_active_budgets(db, None)?;
    out.push_str(&format!("\nActive Budgets: {}\n", active.len()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{date, establish_test_database};
    use crate::models::budget::{BudgetType, NewBudget};
    use rust_decimal::Decimal;

    #[test]
    fn test_statistics_counts() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        category_repository::create(&db, "Food", "", "").unwrap();
        for (name, active) in [("January", true), ("December", false)] {
            budget_repository::create(
                &db,
                &NewBudget {
                    user_id: user,
                    name: name.to_string(),
                    budget_type: BudgetType::Custom,
                    total_amount: Decimal::from(100),
                    start_date: date(2024, 1, 1),
                    end_date: date(2024, 1, 31),
                    is_active: active,
                },
            )
            .unwrap();
        }

        let out = show_statistics(&db).unwrap();
        assert!(out.contains("Total Users: 1"));
        assert!(out.contains("Total Categories: 1"));
        assert!(out.contains("Total Budgets: 2"));
        assert!(out.contains("Total Budget Rules: 0"));
        assert!(out.contains("Total Transactions: 0"));
        assert!(out.contains("Active Budgets: 1"));
    }
}
