pub mod add;
pub mod budget;
pub mod listing;
pub mod spending;
pub mod stats;

use crate::error::DbError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("{0}")]
    Input(String),
    #[error("{0} not found.")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub const SEPARATOR_WIDTH: usize = 60;

pub fn parse_id(input: &str, entity: &str) -> Result<i64, OperationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(OperationError::Input(format!("Invalid {} ID.", entity)));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| OperationError::Input(format!("Invalid {} ID.", entity)))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, OperationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        OperationError::Input(format!(
            "Invalid date '{}'. Please use YYYY-MM-DD.",
            input.trim()
        ))
    })
}

pub fn title(text: &str) -> String {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    format!("\n{}\n{}\n{}\n", rule, text, rule)
}

/// `$1,234.50`, `-$25.00`.
pub fn format_money(amount: Decimal) -> String {
    let rounded = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::new();
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

/// Cuts `text` to at most `width` characters, marking the cut with `..`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(2)).collect();
    format!("{}..", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 42 ", "user").unwrap(), 42);
        assert_eq!(parse_id("-1", "user").unwrap_err().to_string(), "Invalid user ID.");
        assert_eq!(parse_id("", "budget").unwrap_err().to_string(), "Invalid budget ID.");
        assert!(parse_id("abc", "budget").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(parse_date("31/01/2024").unwrap_err().to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::from_str("80").unwrap()), "$80.00");
        assert_eq!(format_money(Decimal::from_str("1234567.891").unwrap()), "$1,234,567.89");
        assert_eq!(format_money(Decimal::from_str("-25.5").unwrap()), "-$25.50");
        assert_eq!(format_money(Decimal::from_str("100.00").unwrap()), "$100.00");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer description", 10), "a much l..");
        assert_eq!(truncate("🍔🍔🍔", 3), "🍔🍔🍔");
    }
}
