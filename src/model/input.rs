//! Validation of user-entered transactions.
//!
//! Input arrives as text, the way a user typed it. Validation either produces a complete
//! `Transaction` or a set of field-level messages; nothing is partially applied.

use crate::currency::Currency;
use crate::model::{Amount, Frequency, Recurrence, Transaction, TransactionType};
use crate::utils::generate_id;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub(crate) const DESCRIPTION_REQUIRED: &str = "Description is required.";
pub(crate) const AMOUNT_INVALID: &str = "Please enter a valid positive amount.";
pub(crate) const AMOUNT_TOO_LARGE: &str = "Please enter an amount no larger than 1,000,000,000,000.";
pub(crate) const DATE_INVALID: &str = "Please enter a valid date.";
pub(crate) const DATE_IN_FUTURE: &str =
    "Date cannot be in the future for non-recurring transactions.";
pub(crate) const CATEGORY_REQUIRED: &str = "Category is required.";

/// The input field a validation message belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    Description,
    Amount,
    Category,
    Date,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Date => "date",
        };
        f.write_str(s)
    }
}

/// One message per invalid field.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "Invalid input: {}", parts.join(" "))
    }
}

impl std::error::Error for FieldErrors {}

/// The largest amount accepted from the user, in the currency it was entered in. Sums of amounts
/// this size stay far inside the range of `Decimal`.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Parses a user-entered amount, requiring it to be strictly positive and at most `MAX_AMOUNT`.
/// The error is the message to show for the amount field.
pub(crate) fn parse_positive_amount(s: &str) -> Result<Amount, &'static str> {
    let amount = Amount::from_str(s)
        .ok()
        .filter(Amount::is_positive)
        .ok_or(AMOUNT_INVALID)?;
    if amount.value() > MAX_AMOUNT {
        return Err(AMOUNT_TOO_LARGE);
    }
    Ok(amount)
}

/// A transaction as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct TransactionInput {
    pub kind: TransactionType,
    pub description: String,
    /// The amount as typed, in `amount_currency`.
    pub amount: String,
    pub amount_currency: Currency,
    pub category: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `Some` when the transaction repeats.
    pub recurring: Option<Frequency>,
}

struct Checked {
    description: String,
    amount: Amount,
    category: String,
    date: NaiveDate,
}

impl TransactionInput {
    fn check(&self, today: NaiveDate) -> Result<Checked, FieldErrors> {
        let mut errors = FieldErrors::default();

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert(Field::Description, DESCRIPTION_REQUIRED);
        }

        let amount = match parse_positive_amount(&self.amount) {
            Ok(amount) => Some(amount),
            Err(message) => {
                errors.insert(Field::Amount, message);
                None
            }
        };

        let category = self.category.trim();
        if category.is_empty() {
            errors.insert(Field::Category, CATEGORY_REQUIRED);
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        match date {
            None => errors.insert(Field::Date, DATE_INVALID),
            Some(d) if d > today && self.recurring.is_none() => {
                errors.insert(Field::Date, DATE_IN_FUTURE)
            }
            Some(_) => {}
        }

        match (amount, date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(Checked {
                description: description.to_string(),
                amount: self.amount_currency.to_base(amount),
                category: category.to_string(),
                date,
            }),
            _ => Err(errors),
        }
    }

    /// Validates the input and builds a new transaction with a fresh id. A recurring transaction is
    /// first due one period after its date.
    pub fn build_new(&self, today: NaiveDate) -> Result<Transaction, FieldErrors> {
        let checked = self.check(today)?;
        let recurrence = match self.recurring {
            Some(frequency) => Some(schedule(frequency, checked.date)?),
            None => None,
        };
        Ok(assemble(generate_id(), checked, self.kind, recurrence))
    }

    /// Validates the input as a replacement for `existing`. The id is kept. A recurring transaction
    /// keeps its stored due date unless its frequency changed or it was not recurring before.
    pub fn build_update(
        &self,
        existing: &Transaction,
        today: NaiveDate,
    ) -> Result<Transaction, FieldErrors> {
        let checked = self.check(today)?;
        let recurrence = match (self.recurring, existing.recurrence()) {
            (None, _) => None,
            (Some(frequency), Some(r)) if r.frequency() == frequency => Some(*r),
            (Some(frequency), _) => Some(schedule(frequency, checked.date)?),
        };
        Ok(assemble(
            existing.id().to_string(),
            checked,
            self.kind,
            recurrence,
        ))
    }
}

fn schedule(frequency: Frequency, date: NaiveDate) -> Result<Recurrence, FieldErrors> {
    Recurrence::starting(frequency, date).map_err(|e| FieldErrors::single(Field::Date, e.to_string()))
}

fn assemble(
    id: String,
    checked: Checked,
    kind: TransactionType,
    recurrence: Option<Recurrence>,
) -> Transaction {
    Transaction {
        id,
        date: checked.date,
        description: checked.description,
        amount: checked.amount,
        category: checked.category,
        kind,
        recurrence,
    }
}
