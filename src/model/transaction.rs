use crate::model::{Amount, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The default categories offered for this type.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Expense => EXPENSE_CATEGORIES,
        }
    }
}

/// How often a recurring transaction comes due.
///
/// This is a closed set on purpose: a frequency string that does not parse into one of these
/// variants is rejected when the record is read, so a due date can always be advanced.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(Frequency);
serde_plain::derive_fromstr_from_deserialize!(Frequency);

impl Frequency {
    /// Returns `date` moved forward by `periods` whole periods.
    ///
    /// Months and years use calendar arithmetic and clamp to the last day of a shorter month, so
    /// `2024-01-31` plus one month is `2024-02-29`. Because the offset is always taken from `date`,
    /// the day-of-month comes back once the months are long enough again: two months after
    /// `2024-01-31` is `2024-03-31`.
    ///
    /// Returns `None` if the result falls outside of the supported calendar range.
    pub fn advance(self, date: NaiveDate, periods: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(periods))),
            Frequency::Monthly => date.checked_add_months(Months::new(periods)),
            Frequency::Yearly => date.checked_add_months(Months::new(periods.checked_mul(12)?)),
        }
    }
}

/// The recurrence information for a recurring transaction (a "template" that comes due on a
/// schedule).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Recurrence {
    frequency: Frequency,
    next_due_date: NaiveDate,
}

impl Recurrence {
    pub fn new(frequency: Frequency, next_due_date: NaiveDate) -> Self {
        Self {
            frequency,
            next_due_date,
        }
    }

    /// The recurrence for a transaction first entered on `date`: it is next due one period later.
    pub fn starting(frequency: Frequency, date: NaiveDate) -> Result<Self> {
        let next_due_date = frequency
            .advance(date, 1)
            .with_context(|| format!("Cannot schedule a {frequency} recurrence from {date}"))?;
        Ok(Self::new(frequency, next_due_date))
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn next_due_date(&self) -> NaiveDate {
        self.next_due_date
    }

    pub(crate) fn set_next_due_date(&mut self, date: NaiveDate) {
        self.next_due_date = date;
    }
}

/// A single income or expense entry, optionally recurring.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    pub(crate) kind: TransactionType,
    pub(crate) recurrence: Option<Recurrence>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// True when the transaction's date is in the same calendar month as `day`.
    pub fn in_month_of(&self, day: NaiveDate) -> bool {
        use chrono::Datelike;
        self.date.year() == day.year() && self.date.month() == day.month()
    }
}

/// The stored shape of a transaction. The recurrence fields are flat and optional here; the
/// conversion into `Transaction` enforces that they are either all present or all absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    id: String,
    date: NaiveDate,
    description: String,
    amount: Amount,
    category: String,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_due_date: Option<NaiveDate>,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = anyhow::Error;

    fn try_from(r: TransactionRecord) -> Result<Self> {
        let recurrence = match (r.is_recurring.unwrap_or(false), r.frequency, r.next_due_date) {
            (true, Some(frequency), Some(next)) => Some(Recurrence::new(frequency, next)),
            (false, None, None) => None,
            (true, _, _) => bail!(
                "Recurring transaction '{}' must have both a frequency and a next due date",
                r.id
            ),
            (false, _, _) => bail!(
                "Transaction '{}' is not recurring but has a frequency or next due date",
                r.id
            ),
        };
        Ok(Transaction {
            id: r.id,
            date: r.date,
            description: r.description,
            amount: r.amount,
            category: r.category,
            kind: r.kind,
            recurrence,
        })
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(t: Transaction) -> Self {
        TransactionRecord {
            id: t.id,
            date: t.date,
            description: t.description,
            amount: t.amount,
            category: t.category,
            kind: t.kind,
            is_recurring: t.recurrence.map(|_| true),
            frequency: t.recurrence.map(|r| r.frequency),
            next_due_date: t.recurrence.map(|r| r.next_due_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_categories_by_type() {
        assert!(TransactionType::Expense.categories().contains(&"Groceries"));
        assert!(!TransactionType::Income.categories().contains(&"Groceries"));
        assert_eq!(TransactionType::Income.categories()[0], "Salary");
    }

    #[test]
    fn test_advance_weekly() {
        let d = date("2024-12-28");
        assert_eq!(Frequency::Weekly.advance(d, 1), Some(date("2025-01-04")));
        assert_eq!(Frequency::Weekly.advance(d, 3), Some(date("2025-01-18")));
    }

    #[test]
    fn test_advance_monthly_clamps_to_month_end() {
        let d = date("2023-01-31");
        assert_eq!(Frequency::Monthly.advance(d, 1), Some(date("2023-02-28")));
        let leap = date("2024-01-31");
        assert_eq!(Frequency::Monthly.advance(leap, 1), Some(date("2024-02-29")));
        assert_eq!(Frequency::Monthly.advance(leap, 2), Some(date("2024-03-31")));
    }

    #[test]
    fn test_advance_yearly_from_leap_day() {
        let d = date("2024-02-29");
        assert_eq!(Frequency::Yearly.advance(d, 1), Some(date("2025-02-28")));
        assert_eq!(Frequency::Yearly.advance(d, 4), Some(date("2028-02-29")));
    }

    #[test]
    fn test_recurrence_starting() {
        let r = Recurrence::starting(Frequency::Monthly, date("2024-05-15")).unwrap();
        assert_eq!(r.next_due_date(), date("2024-06-15"));
        assert_eq!(r.frequency(), Frequency::Monthly);
    }

    #[test]
    fn test_frequency_from_str() {
        use std::str::FromStr;
        assert_eq!(Frequency::from_str("weekly").unwrap(), Frequency::Weekly);
        assert!(Frequency::from_str("fortnightly").is_err());
        assert_eq!(Frequency::Yearly.to_string(), "yearly");
    }

    #[test]
    fn test_deserialize_stored_shape() {
        let json = r#"{
            "id": "abc",
            "date": "2024-06-01",
            "description": "Rent",
            "amount": 1200,
            "category": "Rent/Mortgage",
            "type": "expense",
            "isRecurring": true,
            "frequency": "monthly",
            "nextDueDate": "2024-07-01"
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind(), TransactionType::Expense);
        let r = t.recurrence().unwrap();
        assert_eq!(r.frequency(), Frequency::Monthly);
        assert_eq!(r.next_due_date(), date("2024-07-01"));
    }

    #[test]
    fn test_serialize_omits_recurrence_for_one_off() {
        let json = r#"{"id":"1","date":"2024-06-01","description":"Lunch","amount":"12.5",
            "category":"Dining Out","type":"expense"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert!(!t.is_recurring());
        let out = serde_json::to_string(&t).unwrap();
        assert!(!out.contains("isRecurring"));
        assert!(!out.contains("nextDueDate"));
        assert!(out.contains("\"type\":\"expense\""));
    }

    #[test]
    fn test_deserialize_rejects_partial_recurrence() {
        let json = r#"{"id":"1","date":"2024-06-01","description":"Gym","amount":"30",
            "category":"Health","type":"expense","isRecurring":true,"frequency":"monthly"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());

        let json = r#"{"id":"1","date":"2024-06-01","description":"Gym","amount":"30",
            "category":"Health","type":"expense","isRecurring":false,"nextDueDate":"2024-07-01"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_frequency() {
        let json = r#"{"id":"1","date":"2024-06-01","description":"Gym","amount":"30",
            "category":"Health","type":"expense","isRecurring":true,"frequency":"daily",
            "nextDueDate":"2024-07-01"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_in_month_of() {
        let json = r#"{"id":"1","date":"2024-06-30","description":"x","amount":"1",
            "category":"Other","type":"expense"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert!(t.in_month_of(date("2024-06-01")));
        assert!(!t.in_month_of(date("2024-07-01")));
        assert!(!t.in_month_of(date("2023-06-15")));
    }
}
