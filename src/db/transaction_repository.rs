use crate::db::executor::{Database, UpdateBuilder};
use crate::error::DbError;
use crate::models::money::{from_hundredths, to_hundredths};
use crate::models::transaction::{
    CategorySpending, NewTransaction, Transaction, TransactionDetail, TransactionPatch,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::{Row, params};

const TRANSACTION_COLUMNS: &str = "t.transaction_id AS transaction_id, t.user_id AS user_id,
     t.category_id AS category_id, t.amount AS amount, t.transaction_date AS transaction_date,
     t.description AS description, t.payment_method AS payment_method,
     t.created_at AS created_at, t.updated_at AS updated_at";

const DETAIL_FROM: &str = "FROM transactions t
     JOIN users u ON t.user_id = u.user_id
     JOIN categories c ON t.category_id = c.category_id";

const NEWEST_FIRST: &str =
    "ORDER BY t.transaction_date DESC, t.created_at DESC, t.transaction_id DESC";

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get("transaction_id")?,
        user_id: row.get("user_id")?,
        category_id: row.get("category_id")?,
        amount: from_hundredths(row.get("amount")?),
        date: row.get("transaction_date")?,
        description: row.get("description")?,
        payment_method: row.get("payment_method")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_detail(row: &Row<'_>) -> rusqlite::Result<TransactionDetail> {
    Ok(TransactionDetail {
        transaction: map_transaction(row)?,
        username: row.get("username")?,
        category_name: row.get("category_name")?,
        icon: row.get("icon")?,
    })
}

fn detail_query(filter: &str) -> String {
    format!(
        "SELECT {}, u.username AS username, c.category_name AS category_name, c.icon AS icon
         {} {} {}",
        TRANSACTION_COLUMNS, DETAIL_FROM, filter, NEWEST_FIRST
    )
}

// SQLite treats a negative LIMIT as "no limit".
fn limit_param(limit: Option<usize>) -> i64 {
    limit.map(|l| l as i64).unwrap_or(-1)
}

/// Fails with a constraint violation when the user or category does not
/// exist.
pub fn create(db: &Database, transaction: &NewTransaction) -> Result<i64, DbError> {
    let outcome = db.execute(
        "INSERT INTO transactions (user_id, category_id, amount, transaction_date,
                                   description, payment_method)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            transaction.user_id,
            transaction.category_id,
            to_hundredths(transaction.amount)?,
            transaction.date,
            &transaction.description,
            &transaction.payment_method,
        ],
    )?;
    Ok(outcome.last_insert_id)
}

pub fn get_by_id(db: &Database, transaction_id: i64) -> Result<Option<Transaction>, DbError> {
    db.fetch_optional(
        &format!(
            "SELECT {} FROM transactions t WHERE t.transaction_id = ?1",
            TRANSACTION_COLUMNS
        ),
        [transaction_id],
        map_transaction,
    )
}

pub fn get_detail_by_id(
    db: &Database,
    transaction_id: i64,
) -> Result<Option<TransactionDetail>, DbError> {
    db.fetch_optional(
        &detail_query("WHERE t.transaction_id = ?1"),
        [transaction_id],
        map_detail,
    )
}

/// Most recent transactions first, at most `limit` of them.
pub fn get_all(db: &Database, limit: Option<usize>) -> Result<Vec<TransactionDetail>, DbError> {
    db.fetch_all(
        &format!("{} LIMIT ?1", detail_query("")),
        [limit_param(limit)],
        map_detail,
    )
}

pub fn get_by_user(
    db: &Database,
    user_id: i64,
    limit: Option<usize>,
) -> Result<Vec<TransactionDetail>, DbError> {
    db.fetch_all(
        &format!("{} LIMIT ?2", detail_query("WHERE t.user_id = ?1")),
        [user_id, limit_param(limit)],
        map_detail,
    )
}

pub fn get_by_category(
    db: &Database,
    category_id: i64,
    limit: Option<usize>,
) -> Result<Vec<TransactionDetail>, DbError> {
    db.fetch_all(
        &format!("{} LIMIT ?2", detail_query("WHERE t.category_id = ?1")),
        [category_id, limit_param(limit)],
        map_detail,
    )
}

/// Transactions of a user dated within `start..=end`.
pub fn get_by_date_range(
    db: &Database,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<TransactionDetail>, DbError> {
    db.fetch_all(
        &detail_query("WHERE t.user_id = ?1 AND t.transaction_date BETWEEN ?2 AND ?3"),
        params![user_id, start, end],
        map_detail,
    )
}

pub fn update(db: &Database, transaction_id: i64, patch: &TransactionPatch) -> Result<bool, DbError> {
    let amount = patch.amount.map(to_hundredths).transpose()?;

    let mut builder = UpdateBuilder::new("transactions", "transaction_id").touch_updated_at();
    builder
        .set("category_id", patch.category_id)
        .set("amount", amount)
        .set("transaction_date", patch.date)
        .set("description", patch.description.as_deref())
        .set("payment_method", patch.payment_method.as_deref());
    builder.execute(db, transaction_id)
}

pub fn delete(db: &Database, transaction_id: i64) -> Result<bool, DbError> {
    let outcome = db.execute(
        "DELETE FROM transactions WHERE transaction_id = ?1",
        [transaction_id],
    )?;
    Ok(outcome.rows_affected > 0)
}

pub fn count(db: &Database) -> Result<i64, DbError> {
    db.fetch_one("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
}

/// Per-category totals of a user's transactions within `start..=end`,
/// biggest spend first. Categories without transactions in range are left
/// out.
pub fn get_spending_by_category(
    db: &Database,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CategorySpending>, DbError> {
    db.fetch_all(
        "SELECT c.category_id AS category_id, c.category_name AS category_name, c.icon AS icon,
                SUM(t.amount) AS total_spent, COUNT(t.transaction_id) AS transaction_count
         FROM transactions t
         JOIN categories c ON t.category_id = c.category_id
         WHERE t.user_id = ?1 AND t.transaction_date BETWEEN ?2 AND ?3
         GROUP BY c.category_id
         ORDER BY total_spent DESC, c.category_name",
        params![user_id, start, end],
        |row| {
            Ok(CategorySpending {
                category_id: row.get("category_id")?,
                category_name: row.get("category_name")?,
                icon: row.get("icon")?,
                total_spent: from_hundredths(row.get("total_spent")?),
                transaction_count: row.get("transaction_count")?,
            })
        },
    )
}

pub fn get_total_spending(
    db: &Database,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, DbError> {
    db.fetch_one(
        "SELECT COALESCE(SUM(amount), 0) FROM transactions
         WHERE user_id = ?1 AND transaction_date BETWEEN ?2 AND ?3",
        params![user_id, start, end],
        |row| Ok(from_hundredths(row.get(0)?)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{amount, date, establish_test_database};
    use crate::db::{category_repository, user_repository};
    use crate::error::ErrorKind;

    fn create_test_transaction(
        db: &Database,
        user: i64,
        category: i64,
        value: &str,
        on: NaiveDate,
    ) -> i64 {
        let mut transaction = NewTransaction::new(user, category, amount(value), on);
        transaction.description = format!("Spent {}", value);
        transaction.payment_method = "card".to_string();
        create(db, &transaction).unwrap()
    }

    #[test]
    fn test_create_and_get_by_id() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "🍔").unwrap();

        let input = NewTransaction {
            user_id: user,
            category_id: food,
            amount: amount("45.67"),
            date: date(2024, 1, 15),
            description: "Lunch".to_string(),
            payment_method: "cash".to_string(),
        };
        let id = create(&db, &input).unwrap();
        let transaction = get_by_id(&db, id).unwrap().unwrap();

        assert_eq!(transaction.user_id, user);
        assert_eq!(transaction.category_id, food);
        assert_eq!(transaction.amount, input.amount);
        assert_eq!(transaction.date, input.date);
        assert_eq!(transaction.description, "Lunch");
        assert_eq!(transaction.payment_method, "cash");

        let detail = get_detail_by_id(&db, id).unwrap().unwrap();
        assert_eq!(detail.username, "alice");
        assert_eq!(detail.category_name, "Food");
    }

    #[test]
    fn test_create_with_missing_category_is_constraint_violation() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();

        let result = create(&db, &NewTransaction::new(user, 7, amount("1"), date(2024, 1, 1)));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Constraint);
        assert_eq!(count(&db).unwrap(), 0);
    }

    #[test]
    fn test_listing_order_and_limit() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        let old = create_test_transaction(&db, user, food, "1", date(2024, 1, 1));
        let new = create_test_transaction(&db, user, food, "2", date(2024, 3, 1));
        let mid = create_test_transaction(&db, user, food, "3", date(2024, 2, 1));

        let ids: Vec<i64> = get_all(&db, None)
            .unwrap()
            .iter()
            .map(|d| d.transaction.id)
            .collect();
        assert_eq!(ids, vec![new, mid, old]);

        let limited = get_all(&db, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].transaction.id, new);
    }

    #[test]
    fn test_get_by_user_and_category() {
        let (db, _dir) = establish_test_database().unwrap();
        let alice = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let bob = user_repository::create(&db, "bob", "b@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        let rent = category_repository::create(&db, "Rent", "", "").unwrap();
        create_test_transaction(&db, alice, food, "1", date(2024, 1, 1));
        create_test_transaction(&db, alice, rent, "2", date(2024, 1, 2));
        create_test_transaction(&db, bob, food, "3", date(2024, 1, 3));

        let alice_rows = get_by_user(&db, alice, None).unwrap();
        assert_eq!(alice_rows.len(), 2);
        assert!(alice_rows.iter().all(|d| d.username == "alice"));
        assert_eq!(get_by_user(&db, alice, Some(1)).unwrap().len(), 1);

        let food_rows = get_by_category(&db, food, None).unwrap();
        assert_eq!(food_rows.len(), 2);
        assert!(food_rows.iter().all(|d| d.category_name == "Food"));
    }

    #[test]
    fn test_get_by_date_range_inclusive() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        create_test_transaction(&db, user, food, "1", date(2024, 1, 1));
        create_test_transaction(&db, user, food, "2", date(2024, 1, 31));
        create_test_transaction(&db, user, food, "3", date(2024, 2, 1));

        let rows = get_by_date_range(&db, user, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_update_partial_and_noop() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        let rent = category_repository::create(&db, "Rent", "", "").unwrap();
        let id = create_test_transaction(&db, user, food, "12.50", date(2024, 1, 1));

        assert!(!update(&db, id, &TransactionPatch::default()).unwrap());

        let patch = TransactionPatch {
            category_id: Some(rent),
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(update(&db, id, &patch).unwrap());

        let transaction = get_by_id(&db, id).unwrap().unwrap();
        assert_eq!(transaction.category_id, rent);
        assert_eq!(transaction.description, "");
        assert_eq!(transaction.amount, amount("12.50"));
        assert_eq!(transaction.payment_method, "card");
    }

    #[test]
    fn test_delete_then_get_is_absent() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        let id = create_test_transaction(&db, user, food, "1", date(2024, 1, 1));

        assert!(delete(&db, id).unwrap());
        assert!(get_by_id(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_deleting_user_removes_its_transactions() {
        let (db, _dir) = establish_test_database().unwrap();
        let alice = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let bob = user_repository::create(&db, "bob", "b@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "").unwrap();
        for day in 1..=3 {
            create_test_transaction(&db, alice, food, "1", date(2024, 1, day));
        }
        create_test_transaction(&db, bob, food, "1", date(2024, 1, 1));
        let before = count(&db).unwrap();

        assert!(user_repository::delete(&db, alice).unwrap());

        assert_eq!(count(&db).unwrap(), before - 3);
        assert!(get_by_user(&db, alice, None).unwrap().is_empty());
    }

    #[test]
    fn test_spending_by_category_and_total_agree() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();
        let food = category_repository::create(&db, "Food", "", "🍔").unwrap();
        let rent = category_repository::create(&db, "Rent", "", "🏠").unwrap();
        category_repository::create(&db, "Travel", "", "✈").unwrap();
        create_test_transaction(&db, user, food, "50.00", date(2024, 1, 5));
        create_test_transaction(&db, user, food, "30.10", date(2024, 1, 6));
        create_test_transaction(&db, user, rent, "400.00", date(2024, 1, 1));
        create_test_transaction(&db, user, rent, "400.00", date(2024, 2, 1));

        let start = date(2024, 1, 1);
        let end = date(2024, 1, 31);
        let summary = get_spending_by_category(&db, user, start, end).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].category_name, "Rent");
        assert_eq!(summary[0].total_spent, amount("400.00"));
        assert_eq!(summary[0].transaction_count, 1);
        assert_eq!(summary[1].category_name, "Food");
        assert_eq!(summary[1].total_spent, amount("80.10"));
        assert_eq!(summary[1].transaction_count, 2);

        let total = get_total_spending(&db, user, start, end).unwrap();
        let summed: Decimal = summary.iter().map(|s| s.total_spent).sum();
        assert_eq!(total, summed);
        assert_eq!(total, amount("480.10"));
    }

    #[test]
    fn test_total_spending_defaults_to_zero() {
        let (db, _dir) = establish_test_database().unwrap();
        let user = user_repository::create(&db, "alice", "a@x.com", "h").unwrap();

        let total = get_total_spending(&db, user, date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert!(
            get_spending_by_category(&db, user, date(2024, 1, 1), date(2024, 12, 31))
                .unwrap()
                .is_empty()
        );
    }
}
