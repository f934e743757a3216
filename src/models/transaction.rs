use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub payment_method: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub payment_method: String,
}

impl NewTransaction {
    pub fn new(user_id: i64, category_id: i64, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            date,
            description: String::new(),
            payment_method: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub category_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
}

/// A transaction joined with its owner's username and its category.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub username: String,
    pub category_name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category_id: i64,
    pub category_name: String,
    pub icon: String,
    pub total_spent: Decimal,
    pub transaction_count: i64,
}
