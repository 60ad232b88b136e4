//! Filtering and sorting of the transaction list.

use crate::model::{Transaction, TransactionType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Description,
    Amount,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// Selects which transactions are listed or exported.
///
/// By default only one-off transactions are selected. Recurring transactions are templates for
/// future entries rather than entries in their own right, so they are kept out of the main list
/// and out of exports; `recurring` selects the templates instead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
    pub recurring: bool,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if t.is_recurring() != self.recurring {
            return false;
        }
        if self.kind.is_some_and(|k| k != t.kind()) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != t.category()) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => t
                .description()
                .to_lowercase()
                .contains(&s.to_lowercase()),
            _ => true,
        }
    }

    /// Returns the matching transactions sorted by `key` in `order`. The sort is stable, so ties
    /// keep their stored order.
    pub fn apply<'a>(
        &self,
        transactions: &'a [Transaction],
        key: SortKey,
        order: SortOrder,
    ) -> Vec<&'a Transaction> {
        let mut selected: Vec<&Transaction> =
            transactions.iter().filter(|t| self.matches(t)).collect();
        selected.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        selected
    }
}

fn compare(a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date().cmp(&b.date()),
        SortKey::Description => a
            .description()
            .to_lowercase()
            .cmp(&b.description().to_lowercase())
            .then_with(|| a.description().cmp(b.description())),
        SortKey::Amount => a.amount().cmp(&b.amount()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Frequency, Recurrence};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(id: &str, day: &str, desc: &str, amount: &str, kind: TransactionType) -> Transaction {
        Transaction {
            id: id.into(),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            description: desc.into(),
            amount: Amount::from_str(amount).unwrap(),
            category: if kind == TransactionType::Income {
                "Salary".into()
            } else {
                "Groceries".into()
            },
            kind,
            recurrence: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        let mut template = txn("4", "2024-08-01", "Rent", "1200", TransactionType::Expense);
        template.recurrence = Some(Recurrence::new(
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        ));
        vec![
            txn("1", "2024-08-03", "Farmers market", "42.10", TransactionType::Expense),
            txn("2", "2024-08-05", "Paycheck", "2500", TransactionType::Income),
            txn("3", "2024-08-01", "corner grocery", "8.99", TransactionType::Expense),
            template,
        ]
    }

    fn ids(list: &[&Transaction]) -> Vec<String> {
        list.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn test_default_excludes_recurring_and_sorts_newest_first() {
        let data = sample();
        let list = TransactionFilter::default().apply(&data, SortKey::Date, SortOrder::Desc);
        assert_eq!(ids(&list), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_recurring_selects_templates_only() {
        let data = sample();
        let filter = TransactionFilter {
            recurring: true,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&data, SortKey::Date, SortOrder::Desc)), vec!["4"]);
    }

    #[test]
    fn test_type_category_and_search() {
        let data = sample();
        let expenses = TransactionFilter {
            kind: Some(TransactionType::Expense),
            ..Default::default()
        };
        assert_eq!(ids(&expenses.apply(&data, SortKey::Amount, SortOrder::Asc)), vec!["3", "1"]);

        let salary = TransactionFilter {
            category: Some("Salary".into()),
            ..Default::default()
        };
        assert_eq!(ids(&salary.apply(&data, SortKey::Date, SortOrder::Desc)), vec!["2"]);

        let search = TransactionFilter {
            search: Some("GROCERY".into()),
            ..Default::default()
        };
        assert_eq!(ids(&search.apply(&data, SortKey::Date, SortOrder::Desc)), vec!["3"]);
    }

    #[test]
    fn test_sort_by_description_ignores_case() {
        let data = sample();
        let list = TransactionFilter::default().apply(&data, SortKey::Description, SortOrder::Asc);
        assert_eq!(ids(&list), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(SortKey::from_str("amount").unwrap(), SortKey::Amount);
        assert_eq!(SortOrder::default().to_string(), "desc");
    }
}
