//! CSV export of the transaction list.
//!
//! Amounts are written in the base currency regardless of the display currency, which is why the
//! header names USD explicitly.

use crate::model::Transaction;
use crate::{utils, Result};
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

pub const NO_TRANSACTIONS: &str = "No transactions to export.";

const HEADER: [&str; 5] = ["Date", "Description", "Amount (USD)", "Category", "Type"];

/// The file name used when the caller does not choose one, e.g. `transactions_2024-08-15.csv`.
pub fn default_file_name(today: NaiveDate) -> String {
    format!("transactions_{}.csv", today.format("%Y-%m-%d"))
}

/// Renders `transactions` as CSV in the order given.
///
/// Fields containing a comma, a double quote or a line break are quoted, with inner quotes
/// doubled. Rows are separated by `\n` and there is no line break after the last row.
///
/// # Errors
/// - Returns an error if `transactions` is empty.
pub fn to_csv<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    let mut rows = 0usize;
    for t in transactions {
        writer
            .write_record([
                t.date().format("%m/%d/%Y").to_string(),
                t.description().to_string(),
                t.amount().to_fixed(),
                t.category().to_string(),
                t.kind().to_string(),
            ])
            .with_context(|| format!("Unable to write transaction '{}' as CSV", t.id()))?;
        rows += 1;
    }
    ensure!(rows > 0, NO_TRANSACTIONS);

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the CSV output: {}", e.error()))?;
    let mut csv = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    if csv.ends_with('\n') {
        csv.pop();
    }
    debug!("Rendered {rows} transactions as CSV");
    Ok(csv)
}

/// Renders `transactions` and writes them to `path`. Returns the number of rows written.
pub async fn write_csv<'a>(
    path: &Path,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<usize> {
    let list: Vec<&Transaction> = transactions.into_iter().collect();
    let csv = to_csv(list.iter().copied())?;
    utils::write(path, csv).await?;
    Ok(list.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use std::str::FromStr;
    use tempfile::TempDir;

    fn txn(day: &str, desc: &str, amount: &str, category: &str, kind: TransactionType) -> Transaction {
        Transaction {
            id: crate::utils::generate_id(),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            description: desc.into(),
            amount: Amount::from_str(amount).unwrap(),
            category: category.into(),
            kind,
            recurrence: None,
        }
    }

    #[test]
    fn test_csv_layout() {
        let data = vec![
            txn("2024-08-03", "Grocery Shopping", "150.75", "Groceries", TransactionType::Expense),
            txn("2024-08-01", "Monthly Salary", "5000", "Salary", TransactionType::Income),
        ];
        let csv = to_csv(&data).unwrap();
        assert_eq!(
            csv,
            "Date,Description,Amount (USD),Category,Type\n\
             08/03/2024,Grocery Shopping,150.75,Groceries,expense\n\
             08/01/2024,Monthly Salary,5000.00,Salary,income"
        );
    }

    #[test]
    fn test_csv_quoting() {
        let data = vec![txn(
            "2024-01-09",
            "Dinner, \"fancy\" place",
            "80",
            "Dining Out",
            TransactionType::Expense,
        )];
        let csv = to_csv(&data).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "01/09/2024,\"Dinner, \"\"fancy\"\" place\",80.00,Dining Out,expense"
        );
    }

    #[test]
    fn test_empty_export_is_an_error() {
        let err = to_csv(&Vec::<Transaction>::new()).unwrap_err();
        assert_eq!(err.to_string(), NO_TRANSACTIONS);
    }

    #[test]
    fn test_default_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert_eq!(default_file_name(today), "transactions_2024-08-15.csv");
    }

    #[tokio::test]
    async fn test_write_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let data = vec![txn("2024-08-03", "Bus", "2.5", "Transport", TransactionType::Expense)];
        let rows = write_csv(&path, &data).await.unwrap();
        assert_eq!(rows, 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("\n08/03/2024,Bus,2.50,Transport,expense"));
    }
}
