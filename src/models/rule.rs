use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Alert threshold, in percent of the limit, used when a rule is created
/// without one.
pub const DEFAULT_ALERT_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRule {
    pub id: i64,
    pub budget_id: i64,
    pub category_id: i64,
    pub limit_amount: Decimal,
    pub alert_threshold: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewBudgetRule {
    pub budget_id: i64,
    pub category_id: i64,
    pub limit_amount: Decimal,
    pub alert_threshold: Decimal,
}

impl NewBudgetRule {
    pub fn new(budget_id: i64, category_id: i64, limit_amount: Decimal) -> Self {
        Self {
            budget_id,
            category_id,
            limit_amount,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetRulePatch {
    pub limit_amount: Option<Decimal>,
    pub alert_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleWithCategory {
    pub rule: BudgetRule,
    pub category_name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpending {
    pub rule: BudgetRule,
    pub category_name: String,
    pub icon: String,
    pub total_spent: Decimal,
    /// Negative when the limit has been overspent.
    pub remaining: Decimal,
    /// `None` when money was spent against a zero limit.
    pub percent_used: Option<Decimal>,
}

pub fn percent_used(spent: Decimal, limit: Decimal) -> Option<Decimal> {
    if limit.is_zero() {
        return if spent.is_zero() { Some(Decimal::ZERO) } else { None };
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}
