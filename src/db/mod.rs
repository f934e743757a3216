pub mod budget_repository;
pub mod category_repository;
pub mod connection;
pub mod executor;
pub mod rule_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use executor::Database;
