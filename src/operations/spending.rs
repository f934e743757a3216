use super::listing::RECENT_TRANSACTIONS_LIMIT;
use super::{OperationError, format_money, parse_date, parse_id, title, truncate};
use crate::db::{Database, transaction_repository, user_repository};
use crate::models::transaction::{CategorySpending, TransactionDetail};
use crate::models::user::User;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn find_user(db: &Database, user_input: &str) -> Result<User, OperationError> {
    let user_id = parse_id(user_input, "user")?;
    user_repository::get_by_id(db, user_id)?
        .ok_or_else(|| OperationError::NotFound(format!("User with ID {}", user_id)))
}

pub fn view_user_transactions(db: &Database, user_input: &str) -> Result<String, OperationError> {
    let user = find_user(db, user_input)?;
    let transactions =
        transaction_repository::get_by_user(db, user.id, Some(RECENT_TRANSACTIONS_LIMIT))?;
    Ok(render_user_transactions(&user, &transactions))
}

pub fn view_spending_summary(
    db: &Database,
    user_input: &str,
    start_input: &str,
    end_input: &str,
) -> Result<String, OperationError> {
    let start = parse_date(start_input)?;
    let end = parse_date(end_input)?;
    if start > end {
        return Err(OperationError::Input(
            "Start date must be before end date.".to_string(),
        ));
    }
    let user = find_user(db, user_input)?;

    let summary = transaction_repository::get_spending_by_category(db, user.id, start, end)?;
    let total = transaction_repository::get_total_spending(db, user.id, start, end)?;
    Ok(render_spending_summary(&user, start, end, &summary, total))
}

fn render_user_transactions(user: &User, transactions: &[TransactionDetail]) -> String {
    let mut out = title(&format!("TRANSACTIONS FOR {}", user.username));
    if transactions.is_empty() {
        out.push_str("No transactions found for this user.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<6} {:<15} {:<10} {:<12} {:<30}\n",
        "ID", "Category", "Amount", "Date", "Description"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));
    let mut total = Decimal::ZERO;
    for detail in transactions {
        let transaction = &detail.transaction;
        total += transaction.amount;
        out.push_str(&format!(
            "{:<6} {:<15} {:<10} {:<12} {:<30}\n",
            transaction.id,
            detail.category_name,
            format_money(transaction.amount),
            transaction.date.format("%Y-%m-%d").to_string(),
            truncate(&transaction.description, 30)
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(80)));
    out.push_str(&format!("Total Spending: {}\n", format_money(total)));
    out.push_str(&format!("Number of Transactions: {}\n", transactions.len()));
    out
}

fn render_spending_summary(
    user: &User,
    start: NaiveDate,
    end: NaiveDate,
    summary: &[CategorySpending],
    total: Decimal,
) -> String {
    let mut out = title(&format!(
        "SPENDING SUMMARY FOR {}\nPeriod: {} to {}",
        user.username, start, end
    ));
    if summary.is_empty() {
        out.push_str("No transactions found for this period.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<20} {:<6} {:<15} {:<15}\n",
        "Category", "Icon", "Transactions", "Total Spent"
    ));
    out.push_str(&format!("{}\n", "-".repeat(SUMMARY_WIDTH)));
    for item in summary {
        out.push_str(&format!(
            "{:<20} {:<6} {:<15} {:<15}\n",
            item.category_name,
            item.icon.chars().take(5).collect::<String>(),
            item.transaction_count,
            format_money(item.total_spent)
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(SUMMARY_WIDTH)));
    out.push_str(&format!("TOTAL SPENDING: {}\n", format_money(total)));
    out
}

const SUMMARY_WIDTH: usize = 60;
