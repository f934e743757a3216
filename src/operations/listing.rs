use super::{OperationError, format_money, title, truncate};
use crate::db::{Database, budget_repository, category_repository, transaction_repository, user_repository};
use crate::models::budget::Budget;
use crate::models::category::CategoryWithCount;
use crate::models::transaction::TransactionDetail;
use crate::models::user::User;

pub const RECENT_TRANSACTIONS_LIMIT: usize = 50;

pub fn view_all_users(db: &Database) -> Result<String, OperationError> {
    let users = user_repository::get_all(db)?;
    Ok(render_users(&users))
}

pub fn view_all_categories(db: &Database) -> Result<String, OperationError> {
    let categories = category_repository::get_with_transaction_count(db)?;
    Ok(render_categories(&categories))
}

pub fn view_all_budgets(db: &Database) -> Result<String, OperationError> {
    let budgets = budget_repository::get_all(db)?;
    Ok(render_budgets(&budgets))
}

pub fn view_all_transactions(db: &Database) -> Result<String, OperationError> {
    let transactions = transaction_repository::get_all(db, Some(RECENT_TRANSACTIONS_LIMIT))?;
    Ok(render_transactions(&transactions))
}

fn render_users(users: &[User]) -> String {
    let mut out = title("ALL USERS");
    if users.is_empty() {
        out.push_str("No users found.\n");
        return out;
    }

    out.push_str(&format!("\n{:<5} {:<20} {:<30} {:<20}\n", "ID", "Username", "Email", "Created"));
    out.push_str(&format!("{}\n", "-".repeat(80)));
    for user in users {
        out.push_str(&format!(
            "{:<5} {:<20} {:<30} {:<20}\n",
            user.id,
            user.username,
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M").to_string()
        ));
    }
    out.push_str(&format!("\nTotal Users: {}\n", users.len()));
    out
}

fn render_categories(categories: &[CategoryWithCount]) -> String {
    let mut out = title("ALL CATEGORIES");
    if categories.is_empty() {
        out.push_str("No categories found.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<5} {:<6} {:<20} {:<30} {:<12}\n",
        "ID", "Icon", "Name", "Description", "Transactions"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));
    for entry in categories {
        let category = &entry.category;
        out.push_str(&format!(
            "{:<5} {:<6} {:<20} {:<30} {:<12}\n",
            category.id,
            category.icon.chars().take(5).collect::<String>(),
            category.name,
            truncate(&category.description, 30),
            entry.transaction_count
        ));
    }
    out.push_str(&format!("\nTotal Categories: {}\n", categories.len()));
    out
}

fn render_budgets(budgets: &[Budget]) -> String {
    let mut out = title("ALL BUDGETS");
    if budgets.is_empty() {
        out.push_str("No budgets found.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<5} {:<8} {:<25} {:<10} {:<12} {:<8}\n",
        "ID", "User ID", "Name", "Type", "Amount", "Active"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));
    for budget in budgets {
        out.push_str(&format!(
            "{:<5} {:<8} {:<25} {:<10} {:<12} {:<8}\n",
            budget.id,
            budget.user_id,
            truncate(&budget.name, 25),
            budget.budget_type.as_str(),
            format_money(budget.total_amount),
            if budget.is_active { "Yes" } else { "No" }
        ));
    }
    out.push_str(&format!("\nTotal Budgets: {}\n", budgets.len()));
    out
}

fn render_transactions(transactions: &[TransactionDetail]) -> String {
    let mut out = title(&format!(
        "RECENT TRANSACTIONS (Last {})",
        RECENT_TRANSACTIONS_LIMIT
    ));
    if transactions.is_empty() {
        out.push_str("No transactions found.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<6} {:<15} {:<15} {:<10} {:<12} {:<25}\n",
        "ID", "User", "Category", "Amount", "Date", "Description"
    ));
    out.push_str(&format!("{}\n", "-".repeat(90)));
    for detail in transactions {
        let transaction = &detail.transaction;
        out.push_str(&format!(
            "{:<6} {:<15} {:<15} {:<10} {:<12} {:<25}\n",
            transaction.id,
            detail.username,
            detail.category_name,
            format_money(transaction.amount),
            transaction.date.format("%Y-%m-%d").to_string(),
            truncate(&transaction.description, 25)
        ));
    }
    out.push_str(&format!("\nShowing {} transactions\n", transactions.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{date, establish_test_database};
    use crate::models::budget::{BudgetType, NewBudget};
    use crate::models::transaction::NewTransaction;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_listings() {
        let (db, _dir) = establish_test_database().unwrap();
        assert!(view_all_users(&db).unwrap().contains("No users found."));
        assert!(view_all_categories(&db).unwrap().contains("No categories found."));
        assert!(view_all_budgets(&db).unwrap().contains("No budgets found."));
        assert!(view_all_transactions(&db).unwrap().contains("No transactions found."));
    }

    #[test]
    fn test_listings_show_rows_and_totals() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "Meals", "🍔").unwrap();
        budget_repository::create(
            &db,
            &NewBudget {
                user_id: user,
                name: "January".to_string(),
                budget_type: BudgetType::Moderate,
                total_amount: Decimal::from(1500),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 31),
                is_active: true,
            },
        )
        .unwrap();
        let mut transaction = NewTransaction::new(
            user,
            food,
            Decimal::new(4567, 2),
            date(2024, 1, 15),
        );
        transaction.description = "Groceries for the whole week and more".to_string();
        transaction_repository::create(&db, &transaction).unwrap();

        let users = view_all_users(&db).unwrap();
        assert!(users.contains("alice"));
        assert!(users.contains("Total Users: 1"));

        let categories = view_all_categories(&db).unwrap();
        assert!(categories.contains("Food"));
        assert!(categories.contains("Total Categories: 1"));

        let budgets = view_all_budgets(&db).unwrap();
        assert!(budgets.contains("moderate"));
        assert!(budgets.contains("$1,500.00"));
        assert!(budgets.contains("Yes"));

        let transactions = view_all_transactions(&db).unwrap();
        assert!(transactions.contains("$45.67"));
        assert!(transactions.contains("2024-01-15"));
        assert!(transactions.contains("Groceries for the whole.."));
        assert!(transactions.contains("Showing 1 transactions"));
    }
}
