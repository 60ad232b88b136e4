//! fintrack: a personal finance tracker.
//!
//! The ledger holds transactions and monthly budgets. Every command starts with an evaluation
//! pass that rolls recurring due dates forward and derives notifications for payments coming due
//! and budgets that are nearly spent.

pub mod args;
pub mod commands;
mod config;
pub mod currency;
mod db;
pub mod engine;
mod error;
pub mod export;
pub mod filter;
pub mod insight;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod recurring;
pub mod store;
pub mod summary;
mod utils;

pub use config::Config;
pub use currency::Currency;
pub use error::Error;
pub use error::Result;
pub use insight::Mode;
