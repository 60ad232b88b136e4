//! The in-memory state of the tracker: transactions and budgets.
//!
//! A `Ledger` is loaded from the store at the start of a session, mutated by commands and written
//! back. Transactions are kept sorted by date, newest first.

use crate::currency::Currency;
use crate::engine::{evaluate, Evaluation};
use crate::model::{parse_positive_amount, Budget, Period, Transaction, TransactionInput};
use crate::utils::generate_id;
use crate::Result;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const DUPLICATE_BUDGET: &str = "A budget for this category already exists.";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>, budgets: Vec<Budget>) -> Self {
        let mut ledger = Self {
            transactions,
            budgets,
        };
        ledger.sort();
        ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    fn sort(&mut self) {
        self.transactions.sort_by(|a, b| b.date().cmp(&a.date()));
    }

    /// Validates `input` and adds it as a new transaction. Returns the stored transaction.
    ///
    /// # Errors
    /// - Returns the field errors if the input is invalid. Nothing is added in that case.
    pub fn add_transaction(
        &mut self,
        input: &TransactionInput,
        today: NaiveDate,
    ) -> Result<Transaction> {
        let t = input.build_new(today)?;
        debug!("Adding transaction {} '{}'", t.id(), t.description());
        self.transactions.push(t.clone());
        self.sort();
        Ok(t)
    }

    /// Replaces the transaction with `id` by the validated `input`, keeping its id.
    pub fn update_transaction(
        &mut self,
        id: &str,
        input: &TransactionInput,
        today: NaiveDate,
    ) -> Result<Transaction> {
        let position = self.position(id)?;
        let updated = input.build_update(&self.transactions[position], today)?;
        debug!("Updating transaction {id}");
        self.transactions[position] = updated.clone();
        self.sort();
        Ok(updated)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let position = self.position(id)?;
        debug!("Deleting transaction {id}");
        Ok(self.transactions.remove(position))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id() == id)
            .with_context(|| format!("No transaction with id '{id}'"))
    }

    /// Adds a monthly budget for `category`. `amount` is as typed by the user in `currency`.
    ///
    /// # Errors
    /// - The category is empty.
    /// - The amount is not a positive number.
    /// - A budget for the category already exists.
    pub fn add_budget(
        &mut self,
        category: &str,
        amount: &str,
        currency: Currency,
    ) -> Result<Budget> {
        let category = category.trim();
        ensure!(!category.is_empty(), "Category is required.");
        let amount = match parse_positive_amount(amount) {
            Ok(amount) => amount,
            Err(message) => bail!(message),
        };
        ensure!(
            !self.budgets.iter().any(|b| b.category() == category),
            DUPLICATE_BUDGET
        );
        let budget = Budget {
            id: generate_id(),
            category: category.to_string(),
            amount: currency.to_base(amount),
            period: Period::Monthly,
        };
        debug!("Adding budget {} for '{category}'", budget.id());
        self.budgets.push(budget.clone());
        Ok(budget)
    }

    /// Removes the budget whose id or category is `key`.
    pub fn delete_budget(&mut self, key: &str) -> Result<Budget> {
        let position = self
            .budgets
            .iter()
            .position(|b| b.id() == key || b.category() == key)
            .with_context(|| format!("No budget for '{key}'"))?;
        Ok(self.budgets.remove(position))
    }

    /// Runs the evaluation pass against this ledger and keeps any rolled-forward due dates.
    /// The returned evaluation says whether anything changed and which notices apply.
    pub fn evaluate(&mut self, today: NaiveDate, currency: Currency) -> Result<Evaluation> {
        let evaluation = evaluate(&self.transactions, &self.budgets, today, currency)?;
        if evaluation.is_dirty() {
            self.transactions = evaluation.transactions().to_vec();
            self.sort();
        }
        Ok(evaluation)
    }
}
