use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// The only budget period that exists today.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
}

/// A monthly spending ceiling for one expense category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub(crate) id: String,
    pub(crate) category: String,
    pub(crate) amount: Amount,
    #[serde(default)]
    pub(crate) period: Period,
}

impl Budget {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn period(&self) -> Period {
        self.period
    }
}

/// Default expense categories offered when entering transactions and budgets.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Groceries",
    "Utilities",
    "Transport",
    "Rent/Mortgage",
    "Entertainment",
    "Dining Out",
    "Shopping",
    "Health",
    "Education",
    "Other",
];

/// Default income categories.
pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investment", "Gift", "Other"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_json_shape() {
        let json = r#"{"id":"b1","category":"Groceries","amount":400,"period":"monthly"}"#;
        let b: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(b.category(), "Groceries");
        assert_eq!(b.amount().to_fixed(), "400.00");
        assert_eq!(b.period(), Period::Monthly);
    }

    #[test]
    fn test_budget_period_defaults_to_monthly() {
        let json = r#"{"id":"b1","category":"Health","amount":"50"}"#;
        let b: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(b.period(), Period::Monthly);
    }
}
