//! Types that represent the core data model, such as `Transaction` and `Budget`.
mod amount;
mod budget;
mod input;
mod transaction;

pub use amount::{Amount, AmountError};
pub use budget::{Budget, Period, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use input::{Field, FieldErrors, TransactionInput};
pub(crate) use input::parse_positive_amount;
#[cfg(test)]
pub(crate) use input::{AMOUNT_INVALID, AMOUNT_TOO_LARGE};
pub use transaction::{Frequency, Recurrence, Transaction, TransactionType};
