//! Foundational types: transactions, currencies, users and the transaction store.

pub mod currency;
pub mod store;
pub mod transaction;
pub mod user;
