use super::{OperationError, parse_date, parse_id, title};
use crate::db::{Database, category_repository, transaction_repository};
use crate::models::transaction::NewTransaction;
use rust_decimal::Decimal;
use std::str::FromStr;

const CATEGORY_CHOICES_SHOWN: usize = 10;
const MAX_DESCRIPTION_LEN: usize = 255;
const MAX_PAYMENT_METHOD_LEN: usize = 50;

pub fn header() -> String {
    title("CREATE NEW TRANSACTION")
}

pub fn category_choices(db: &Database) -> Result<String, OperationError> {
    let categories = category_repository::get_all(db)?;
    let mut out = String::from("\nAvailable Categories:\n");
    for category in categories.iter().take(CATEGORY_CHOICES_SHOWN) {
        out.push_str(&format!("  {}: {}\n", category.id, category.name));
    }
    Ok(out)
}

pub fn parse_amount(input: &str) -> Result<Decimal, OperationError> {
    let amount = Decimal::from_str(input.trim())
        .map_err(|_| OperationError::Input("Invalid amount format.".to_string()))?;
    if amount.normalize().scale() > 2 {
        return Err(OperationError::Input(
            "Amount can have at most two decimal places.".to_string(),
        ));
    }
    if amount <= Decimal::ZERO {
        return Err(OperationError::Input("Amount must be positive.".to_string()));
    }
    Ok(amount)
}

/// Validates the raw console answers for a new transaction.
pub fn create_transaction(
    user_id: i64,
    category_input: &str,
    amount_input: &str,
    date_input: &str,
    description: &str,
    payment_method: &str,
) -> Result<NewTransaction, OperationError> {
    let category_id = parse_id(category_input, "category")?;
    let amount = parse_amount(amount_input)?;
    let date = parse_date(date_input)?;

    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(OperationError::Input("Description too long".to_string()));
    }
    let payment_method = payment_method.trim();
    if payment_method.chars().count() > MAX_PAYMENT_METHOD_LEN {
        return Err(OperationError::Input("Payment method too long".to_string()));
    }

    Ok(NewTransaction {
        user_id,
        category_id,
        amount,
        date,
        description: description.to_string(),
        payment_method: payment_method.to_string(),
    })
}

pub fn add_transaction_to_db(db: &Database, transaction: &NewTransaction) -> Result<i64, OperationError> {
    Ok(transaction_repository::create(db, transaction)?)
}
