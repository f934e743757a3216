pub mod budget;
pub mod category;
pub mod money;
pub mod rule;
pub mod transaction;
pub mod user;
