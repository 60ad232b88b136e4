//! The evaluation pass.
//!
//! One pass rolls every stale recurring due date forward and then derives the notifications that
//! the resulting state calls for. The pass is pure: it takes the current transactions and budgets
//! and returns the new transaction list along with what changed. Running it twice on its own
//! output yields no further roll-forwards and the same notification messages, which the
//! `NotificationStore` then suppresses as duplicates.

use crate::currency::Currency;
use crate::model::{Amount, Budget, Transaction};
use crate::notify::NotificationDraft;
use crate::recurring::roll_forward;
use crate::Result;
use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

/// A recurring transaction is announced when it is due within this many days.
pub const DUE_SOON_DAYS: u64 = 7;

/// A budget is announced once this percentage of it has been spent.
pub const BUDGET_ALERT_PERCENT: u32 = 90;

/// The result of one evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    transactions: Vec<Transaction>,
    rolled: Vec<String>,
    notices: Vec<NotificationDraft>,
}

impl Evaluation {
    /// The transactions with rolled-forward due dates applied. Order is unchanged.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Ids of the transactions whose due date moved. These need to be persisted.
    pub fn rolled(&self) -> &[String] {
        &self.rolled
    }

    pub fn is_dirty(&self) -> bool {
        !self.rolled.is_empty()
    }

    /// Due-soon notices in transaction order, followed by budget notices in budget order.
    pub fn notices(&self) -> &[NotificationDraft] {
        &self.notices
    }
}

/// Runs the evaluation pass for `today`, rendering amounts in `currency`.
///
/// # Errors
/// - Returns an error if a due date cannot be advanced without leaving the calendar range.
pub fn evaluate(
    transactions: &[Transaction],
    budgets: &[Budget],
    today: NaiveDate,
    currency: Currency,
) -> Result<Evaluation> {
    let mut updated = transactions.to_vec();
    let mut rolled = Vec::new();
    for t in updated.iter_mut() {
        let Some(recurrence) = t.recurrence.as_mut() else {
            continue;
        };
        let result = roll_forward(recurrence, today)?;
        if let Some(new_due) = result.new_due_date() {
            debug!(
                "Rolled '{}' forward from {} to {new_due}",
                t.description,
                recurrence.next_due_date()
            );
            recurrence.set_next_due_date(new_due);
            rolled.push(t.id.clone());
        }
    }

    let mut notices = due_soon(&updated, today, currency);
    notices.extend(budget_alerts(&updated, budgets, today, currency));

    Ok(Evaluation {
        transactions: updated,
        rolled,
        notices,
    })
}

/// Info notices for recurring transactions due between `today` and `today + 7` days, inclusive.
pub fn due_soon(
    transactions: &[Transaction],
    today: NaiveDate,
    currency: Currency,
) -> Vec<NotificationDraft> {
    let horizon = today
        .checked_add_days(Days::new(DUE_SOON_DAYS))
        .unwrap_or(NaiveDate::MAX);
    transactions
        .iter()
        .filter_map(|t| {
            let due = t.recurrence()?.next_due_date();
            (today <= due && due <= horizon).then(|| {
                NotificationDraft::info(format!(
                    "Upcoming recurring {}: \"{}\" of {} is due on {}.",
                    t.kind(),
                    t.description(),
                    currency.format(t.amount()),
                    due.format("%-m/%-d/%Y")
                ))
            })
        })
        .collect()
}

/// Total of one-off expenses in `category` dated in the calendar month of `today`.
pub fn monthly_spend(transactions: &[Transaction], category: &str, today: NaiveDate) -> Amount {
    transactions
        .iter()
        .filter(|t| {
            t.is_expense() && !t.is_recurring() && t.category() == category && t.in_month_of(today)
        })
        .map(Transaction::amount)
        .sum()
}

/// The share of `ceiling` that `spent` represents, as a percentage. `None` for a ceiling that is
/// zero or negative. A share too large to represent is reported as `Decimal::MAX`.
pub fn utilization(spent: Amount, ceiling: Amount) -> Option<Decimal> {
    ceiling.is_positive().then(|| {
        spent
            .value()
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(ceiling.value()))
            .unwrap_or(Decimal::MAX)
    })
}

/// Warning notices for budgets whose category spend this month has reached 90%.
pub fn budget_alerts(
    transactions: &[Transaction],
    budgets: &[Budget],
    today: NaiveDate,
    currency: Currency,
) -> Vec<NotificationDraft> {
    let threshold = Decimal::from(BUDGET_ALERT_PERCENT);
    budgets
        .iter()
        .filter_map(|b| {
            let spent = monthly_spend(transactions, b.category(), today);
            let pct = match utilization(spent, b.amount()) {
                Some(pct) if pct >= threshold => pct
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .normalize()
                    .to_string(),
                Some(_) => return None,
                None => {
                    warn!(
                        "Budget for '{}' has a ceiling of {}, which is not positive",
                        b.category(),
                        b.amount()
                    );
                    "Infinity".to_string()
                }
            };
            Some(NotificationDraft::warning(format!(
                "You've spent {} ({pct}%) of your {} budget for {} this month.",
                currency.format(spent),
                currency.format(b.amount()),
                b.category()
            )))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frequency, Period, Recurrence, TransactionType};
    use crate::notify::{NotificationKind, NotificationStore};
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn expense(id: &str, day: &str, category: &str, amount: &str) -> Transaction {
        Transaction {
            id: id.into(),
            date: date(day),
            description: format!("Expense {id}"),
            amount: Amount::from_str(amount).unwrap(),
            category: category.into(),
            kind: TransactionType::Expense,
            recurrence: None,
        }
    }

    fn recurring(id: &str, desc: &str, frequency: Frequency, due: &str, amount: &str) -> Transaction {
        Transaction {
            id: id.into(),
            date: date("2024-01-01"),
            description: desc.into(),
            amount: Amount::from_str(amount).unwrap(),
            category: "Utilities".into(),
            kind: TransactionType::Expense,
            recurrence: Some(Recurrence::new(frequency, date(due))),
        }
    }

    fn budget(category: &str, amount: &str) -> Budget {
        Budget {
            id: format!("b-{category}"),
            category: category.into(),
            amount: Amount::from_str(amount).unwrap(),
            period: Period::Monthly,
        }
    }

    #[test]
    fn test_rolls_forward_and_reports_dirty_ids() {
        let today = date("2024-08-15");
        let txns = vec![
            recurring("r1", "Rent", Frequency::Monthly, "2024-06-01", "1200"),
            recurring("r2", "Gym", Frequency::Monthly, "2024-08-20", "30"),
            expense("e1", "2024-08-02", "Groceries", "10"),
        ];
        let eval = evaluate(&txns, &[], today, Currency::Usd).unwrap();
        assert_eq!(eval.rolled(), &["r1".to_string()]);
        assert!(eval.is_dirty());
        let rent = &eval.transactions()[0];
        assert_eq!(rent.recurrence().unwrap().next_due_date(), date("2024-09-01"));
        assert_eq!(eval.transactions()[1], txns[1]);
        assert_eq!(eval.transactions()[2], txns[2]);
    }

    #[test]
    fn test_due_soon_message() {
        let today = date("2024-08-15");
        let txns = vec![recurring(
            "r1",
            "Internet",
            Frequency::Monthly,
            "2024-08-20",
            "59.99",
        )];
        let notices = due_soon(&txns, today, Currency::Usd);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NotificationKind::Info);
        assert_eq!(
            notices[0].message,
            "Upcoming recurring expense: \"Internet\" of $59.99 is due on 8/20/2024."
        );
    }

    #[test]
    fn test_due_soon_window_is_inclusive() {
        let today = date("2024-08-15");
        let txns = vec![
            recurring("a", "Today", Frequency::Weekly, "2024-08-15", "1"),
            recurring("b", "Edge", Frequency::Weekly, "2024-08-22", "1"),
            recurring("c", "Beyond", Frequency::Weekly, "2024-08-23", "1"),
        ];
        let notices = due_soon(&txns, today, Currency::Usd);
        let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("\"Today\""));
        assert!(messages[1].contains("\"Edge\""));
    }

    #[test]
    fn test_due_soon_uses_display_currency() {
        let today = date("2024-08-15");
        let txns = vec![recurring("a", "Rent", Frequency::Monthly, "2024-08-16", "1000")];
        let notices = due_soon(&txns, today, Currency::Eur);
        assert!(notices[0].message.contains("of €930.00 is due"));
    }

    #[test]
    fn test_rolled_date_within_window_is_announced() {
        let today = date("2024-08-15");
        let txns = vec![recurring("w", "Allowance", Frequency::Weekly, "2024-08-01", "20")];
        let eval = evaluate(&txns, &[], today, Currency::Usd).unwrap();
        assert_eq!(eval.notices().len(), 1);
        assert!(eval.notices()[0].message.ends_with("is due on 8/15/2024."));
    }

    #[test]
    fn test_budget_scenario_groceries() {
        let today = date("2024-08-15");
        let txns = vec![
            expense("1", "2024-08-01", "Groceries", "500"),
            expense("2", "2024-08-10", "Groceries", "450"),
        ];
        let notices = budget_alerts(&txns, &[budget("Groceries", "1000")], today, Currency::Usd);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NotificationKind::Warning);
        assert_eq!(
            notices[0].message,
            "You've spent $950.00 (95%) of your $1,000.00 budget for Groceries this month."
        );
    }

    #[test]
    fn test_budget_threshold_boundary() {
        let today = date("2024-08-15");
        let at = vec![expense("1", "2024-08-01", "Dining Out", "90.00")];
        let notices = budget_alerts(&at, &[budget("Dining Out", "100")], today, Currency::Usd);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("(90%)"));

        let below = vec![expense("1", "2024-08-01", "Dining Out", "89.99")];
        let notices = budget_alerts(&below, &[budget("Dining Out", "100")], today, Currency::Usd);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_budget_percentage_rounds_half_away_from_zero() {
        let today = date("2024-08-15");
        let txns = vec![expense("1", "2024-08-01", "Health", "92.5")];
        let notices = budget_alerts(&txns, &[budget("Health", "100")], today, Currency::Usd);
        assert!(notices[0].message.contains("(93%)"));

        let txns = vec![expense("1", "2024-08-01", "Health", "250")];
        let notices = budget_alerts(&txns, &[budget("Health", "100")], today, Currency::Usd);
        assert!(notices[0].message.contains("(250%)"));
    }

    #[test]
    fn test_budget_spend_excludes_other_months_income_and_recurring() {
        let today = date("2024-08-15");
        let mut income = expense("i", "2024-08-03", "Groceries", "500");
        income.kind = TransactionType::Income;
        let mut template = expense("r", "2024-08-03", "Groceries", "500");
        template.recurrence = Some(Recurrence::new(Frequency::Weekly, date("2024-08-20")));
        let txns = vec![
            expense("a", "2024-07-31", "Groceries", "500"),
            expense("b", "2023-08-10", "Groceries", "500"),
            expense("c", "2024-08-10", "Shopping", "500"),
            income,
            template,
            expense("d", "2024-08-01", "Groceries", "10"),
        ];
        let spent = monthly_spend(&txns, "Groceries", today);
        assert_eq!(spent.to_fixed(), "10.00");
        assert!(budget_alerts(&txns, &[budget("Groceries", "100")], today, Currency::Usd).is_empty());
    }

    #[test]
    fn test_non_positive_ceiling_renders_infinity() {
        let today = date("2024-08-15");
        let notices = budget_alerts(&[], &[budget("Other", "0")], today, Currency::Usd);
        assert_eq!(
            notices[0].message,
            "You've spent $0.00 (Infinity%) of your $0.00 budget for Other this month."
        );
    }

    #[test]
    fn test_amounts_near_decimal_limit_do_not_overflow() {
        // Only reachable through a hand-edited store; validation caps entered amounts.
        let huge = "70000000000000000000000000000";
        let txns = vec![
            expense("a", "2024-08-02", "Groceries", huge),
            expense("b", "2024-08-03", "Groceries", huge),
        ];
        let budgets = vec![budget("Groceries", "10")];

        let spent = monthly_spend(&txns, "Groceries", date("2024-08-15"));
        assert_eq!(spent.value(), Decimal::MAX);
        assert_eq!(utilization(spent, Amount::from_str("10").unwrap()), Some(Decimal::MAX));

        let eval = evaluate(&txns, &budgets, date("2024-08-15"), Currency::Jpy).unwrap();
        assert_eq!(eval.notices().len(), 1);
        assert_eq!(eval.notices()[0].kind, NotificationKind::Warning);
        assert!(eval.notices()[0].message.ends_with("budget for Groceries this month."));
    }

    #[test]
    fn test_notice_order_due_soon_then_budgets() {
        let today = date("2024-08-15");
        let txns = vec![
            recurring("r", "Phone", Frequency::Monthly, "2024-08-18", "40"),
            expense("1", "2024-08-02", "Groceries", "95"),
            expense("2", "2024-08-02", "Transport", "100"),
        ];
        let budgets = vec![budget("Transport", "100"), budget("Groceries", "100")];
        let eval = evaluate(&txns, &budgets, today, Currency::Usd).unwrap();
        let kinds: Vec<NotificationKind> = eval.notices().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Info,
                NotificationKind::Warning,
                NotificationKind::Warning
            ]
        );
        assert!(eval.notices()[1].message.ends_with("for Transport this month."));
        assert!(eval.notices()[2].message.ends_with("for Groceries this month."));
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let today = date("2024-08-15");
        let txns = vec![
            recurring("r", "Rent", Frequency::Monthly, "2024-06-01", "1200"),
            recurring("s", "Streaming", Frequency::Monthly, "2024-08-19", "15"),
            expense("1", "2024-08-02", "Groceries", "95"),
        ];
        let budgets = vec![budget("Groceries", "100")];

        let mut store = NotificationStore::new();
        let first = evaluate(&txns, &budgets, today, Currency::Usd).unwrap();
        let added = store.extend(first.notices().to_vec());
        assert_eq!(added, 2);

        let second = evaluate(first.transactions(), &budgets, today, Currency::Usd).unwrap();
        assert!(!second.is_dirty());
        assert_eq!(second.transactions(), first.transactions());
        assert_eq!(second.notices(), first.notices());
        assert_eq!(store.extend(second.notices().to_vec()), 0);
        assert_eq!(store.len(), 2);
    }
}
