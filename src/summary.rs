//! Aggregate views over the ledger: dashboard totals and budget utilization.

use crate::engine::{monthly_spend, utilization};
use crate::model::{Amount, Budget, Transaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Income, expenses and their difference over some set of transactions.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: Amount,
    pub expenses: Amount,
    pub balance: Amount,
}

impl Totals {
    fn of<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Self {
        let (mut income, mut expenses) = (Decimal::ZERO, Decimal::ZERO);
        for t in transactions {
            match t.kind() {
                TransactionType::Income => income = income.saturating_add(t.amount().value()),
                TransactionType::Expense => {
                    expenses = expenses.saturating_add(t.amount().value())
                }
            }
        }
        Self {
            income: income.into(),
            expenses: expenses.into(),
            balance: income.saturating_sub(expenses).into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Amount,
}

/// The dashboard. Recurring templates are left out of every figure.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub all_time: Totals,
    pub this_month: Totals,
    /// All-time expenses per category, largest first.
    pub expenses_by_category: Vec<CategoryTotal>,
}

pub fn summarize(transactions: &[Transaction], today: NaiveDate) -> Summary {
    let one_off = || transactions.iter().filter(|t| !t.is_recurring());

    let mut by_category: BTreeMap<&str, Amount> = BTreeMap::new();
    for t in one_off().filter(|t| t.is_expense()) {
        let entry = by_category.entry(t.category()).or_default();
        *entry = *entry + t.amount();
    }
    let mut expenses_by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect();
    expenses_by_category.sort_by(|a, b| b.amount.cmp(&a.amount));

    Summary {
        all_time: Totals::of(one_off()),
        this_month: Totals::of(one_off().filter(|t| t.in_month_of(today))),
        expenses_by_category,
    }
}

/// How much of one budget has been used this month.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub ceiling: Amount,
    pub spent: Amount,
    /// `None` when the ceiling is not positive.
    pub percent: Option<Decimal>,
    /// Negative once the budget is exceeded.
    pub remaining: Amount,
}

impl BudgetStatus {
    pub fn is_over(&self) -> bool {
        self.spent > self.ceiling
    }
}

pub fn budget_status(
    transactions: &[Transaction],
    budgets: &[Budget],
    today: NaiveDate,
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|b| {
            let spent = monthly_spend(transactions, b.category(), today);
            BudgetStatus {
                category: b.category().to_string(),
                ceiling: b.amount(),
                spent,
                percent: utilization(spent, b.amount()),
                remaining: Amount::new(b.amount().value().saturating_sub(spent.value())),
            }
        })
        .collect()
}
