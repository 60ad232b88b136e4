//! Persistence of the ledger.
//!
//! Reading and writing are deliberately forgiving. A missing or unreadable transaction list is
//! replaced by the sample data and a missing or unreadable budget list by an empty one. A failed
//! write is logged and reported as `false`; the in-memory ledger remains the source of truth for
//! the rest of the session.

use crate::db::Db;
use crate::ledger::Ledger;
use crate::model::{Amount, Budget, Transaction, TransactionType};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

pub const TRANSACTIONS_KEY: &str = "finance-tracker-transactions";
pub const BUDGETS_KEY: &str = "finance-tracker-budgets";

#[derive(Debug, Clone)]
pub struct Store {
    db: Db,
}

impl Store {
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }

    /// Loads the transaction list, or the sample transactions dated relative to `today` when
    /// nothing usable is stored.
    pub async fn load_transactions(&self, today: NaiveDate) -> Vec<Transaction> {
        self.load(TRANSACTIONS_KEY)
            .await
            .unwrap_or_else(|| seed_transactions(today))
    }

    pub async fn load_budgets(&self) -> Vec<Budget> {
        self.load(BUDGETS_KEY).await.unwrap_or_default()
    }

    pub async fn load_ledger(&self, today: NaiveDate) -> Ledger {
        Ledger::new(
            self.load_transactions(today).await,
            self.load_budgets().await,
        )
    }

    pub async fn save_transactions(&self, transactions: &[Transaction]) -> bool {
        self.save(TRANSACTIONS_KEY, transactions).await
    }

    pub async fn save_budgets(&self, budgets: &[Budget]) -> bool {
        self.save(BUDGETS_KEY, budgets).await
    }

    /// Writes both lists. Returns `false` if either write failed.
    pub async fn save_ledger(&self, ledger: &Ledger) -> bool {
        let transactions = self.save_transactions(ledger.transactions()).await;
        let budgets = self.save_budgets(ledger.budgets()).await;
        transactions && budgets
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.db.get(key).await {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!("Nothing stored under '{key}'");
                return None;
            }
            Err(e) => {
                error!("Error reading '{key}' from storage: {e:#}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Error reading '{key}' from storage, the stored data is not valid: {e}");
                None
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing '{key}': {e}");
                return false;
            }
        };
        match self.db.put(key, &json).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error writing '{key}' to storage: {e:#}");
                false
            }
        }
    }
}

/// The sample transactions shown to a new user: a salary and three expenses from the past week.
pub fn seed_transactions(today: NaiveDate) -> Vec<Transaction> {
    let entries = [
        ("1", 2, "Monthly Salary", Decimal::new(5000, 0), "Salary", TransactionType::Income),
        ("2", 5, "Grocery Shopping", Decimal::new(15075, 2), "Groceries", TransactionType::Expense),
        ("3", 3, "Electricity Bill", Decimal::new(7520, 2), "Utilities", TransactionType::Expense),
        ("4", 1, "Dinner with friends", Decimal::new(8000, 2), "Dining Out", TransactionType::Expense),
    ];
    entries
        .into_iter()
        .map(|(id, days_ago, description, amount, category, kind)| Transaction {
            id: id.to_string(),
            date: today.checked_sub_days(Days::new(days_ago)).unwrap_or(today),
            description: description.to_string(),
            amount: Amount::new(amount),
            category: category.to_string(),
            kind,
            recurrence: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::test::TestEnv;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_yields_seed_and_no_budgets() {
        let env = TestEnv::new().await;
        let store = env.store();
        let transactions = store.load_transactions(today()).await;
        assert_eq!(transactions, seed_transactions(today()));
        assert!(store.load_budgets().await.is_empty());
    }

    #[test]
    fn test_seed_contents() {
        let seed = seed_transactions(today());
        let ids: Vec<&str> = seed.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(seed[0].date(), NaiveDate::from_ymd_opt(2024, 8, 13).unwrap());
        assert_eq!(seed[1].amount().to_fixed(), "150.75");
        assert_eq!(seed[3].category(), "Dining Out");
        assert!(seed.iter().all(|t| !t.is_recurring()));
    }

    #[tokio::test]
    async fn test_round_trip_through_storage() {
        let env = TestEnv::new().await;
        let store = env.store();
        let mut ledger = Ledger::new(seed_transactions(today()), Vec::new());
        ledger.add_budget("Groceries", "300", Currency::Usd).unwrap();
        ledger.delete_transaction("4").unwrap();
        assert!(store.save_ledger(&ledger).await);

        let loaded = store.load_ledger(today()).await;
        assert_eq!(loaded.transactions(), ledger.transactions());
        assert_eq!(loaded.budgets(), ledger.budgets());
    }

    #[tokio::test]
    async fn test_corrupt_data_falls_back() {
        let env = TestEnv::new().await;
        let store = env.store();
        store.db.put(TRANSACTIONS_KEY, "{not json").await.unwrap();
        store.db.put(BUDGETS_KEY, "[{\"id\":1}]").await.unwrap();
        assert_eq!(store.load_transactions(today()).await.len(), 4);
        assert!(store.load_budgets().await.is_empty());
    }

    #[tokio::test]
    async fn test_stored_empty_list_is_kept() {
        let env = TestEnv::new().await;
        let store = env.store();
        assert!(store.save_transactions(&[]).await);
        assert!(store.load_transactions(today()).await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_reports_false() {
        let env = TestEnv::new().await;
        let store = env.store();
        store.db.close().await;
        assert!(!store.save_budgets(&[]).await);
        assert_eq!(store.load_transactions(today()).await.len(), 4);
    }
}
