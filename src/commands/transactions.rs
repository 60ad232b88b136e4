//! Commands that create, change, remove and list transactions.

use crate::args::{AddArgs, DeleteArgs, ListArgs, UpdateArgs};
use crate::commands::{plural, render_table, Out, Session, Settings};
use crate::currency::Currency;
use crate::model::{Transaction, TransactionInput};
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

const DATE_INPUT: &str = "%Y-%m-%d";

/// Adds a transaction. The amount is read in the display currency and stored in USD. The date
/// defaults to today.
///
/// # Errors
/// - Returns the field errors when the input is invalid; nothing is saved in that case.
pub async fn add(config: &Config, settings: Settings, args: &AddArgs) -> Result<Out<Transaction>> {
    let mut session = Session::open(config, settings).await?;
    let today = session.today();
    let input = TransactionInput {
        kind: args.kind(),
        description: args.description().to_string(),
        amount: args.amount().to_string(),
        amount_currency: session.currency(),
        category: args.category().to_string(),
        date: args
            .date()
            .map(str::to_string)
            .unwrap_or_else(|| today.format(DATE_INPUT).to_string()),
        recurring: args.recurring(),
    };
    let added = session.ledger_mut().add_transaction(&input, today)?;
    session.commit().await?;
    if !added.kind().categories().contains(&added.category()) {
        info!(
            "'{}' is not one of the usual {} categories: {}",
            added.category(),
            added.kind(),
            added.kind().categories().join(", ")
        );
    }

    let message = format!(
        "Added {} \"{}\" of {} with id {}",
        added.kind(),
        added.description(),
        session.currency().format(added.amount()),
        added.id()
    );
    Ok(Out::new(message, added))
}

/// Changes the fields given in `args` on the transaction with the given id and keeps the rest.
///
/// `--once` turns a recurring transaction into a one-off. Without `--recurring` or `--once` the
/// transaction keeps its current schedule.
///
/// # Errors
/// - Returns an error if no transaction has the id.
/// - Returns the field errors when the changed transaction would be invalid.
pub async fn update(
    config: &Config,
    settings: Settings,
    args: &UpdateArgs,
) -> Result<Out<Transaction>> {
    let mut session = Session::open(config, settings).await?;
    let today = session.today();
    let existing = session
        .ledger()
        .transaction(args.id())
        .cloned()
        .with_context(|| format!("No transaction with id '{}'", args.id()))?;

    // Stored amounts are already in USD, so an unchanged amount must not be converted again.
    let (amount, amount_currency) = match args.amount() {
        Some(a) => (a.to_string(), session.currency()),
        None => (existing.amount().to_string(), Currency::Usd),
    };
    let recurring = if args.once() {
        None
    } else {
        args.recurring()
            .or_else(|| existing.recurrence().map(|r| r.frequency()))
    };
    let input = TransactionInput {
        kind: args.kind().unwrap_or(existing.kind()),
        description: args
            .description()
            .unwrap_or(existing.description())
            .to_string(),
        amount,
        amount_currency,
        category: args.category().unwrap_or(existing.category()).to_string(),
        date: args
            .date()
            .map(str::to_string)
            .unwrap_or_else(|| existing.date().format(DATE_INPUT).to_string()),
        recurring,
    };

    let updated = session
        .ledger_mut()
        .update_transaction(args.id(), &input, today)?;
    session.commit().await?;
    Ok(Out::new(
        format!("Updated transaction {}", updated.id()),
        updated,
    ))
}

/// Removes the transaction with the given id.
pub async fn delete(
    config: &Config,
    settings: Settings,
    args: &DeleteArgs,
) -> Result<Out<Transaction>> {
    let mut session = Session::open(config, settings).await?;
    let removed = session.ledger_mut().delete_transaction(args.id())?;
    session.commit().await?;
    Ok(Out::new(
        format!(
            "Deleted transaction {} \"{}\"",
            removed.id(),
            removed.description()
        ),
        removed,
    ))
}

/// Lists the transactions that pass the filters in `args`, sorted as requested. Recurring
/// transactions are only listed with `--recurring`, and then only those.
pub async fn list(
    config: &Config,
    settings: Settings,
    args: &ListArgs,
) -> Result<Out<Vec<Transaction>>> {
    let session = Session::open(config, settings).await?;
    let filter = args.filter();
    let selected: Vec<Transaction> = filter
        .filter()
        .apply(session.ledger().transactions(), filter.sort(), filter.order())
        .into_iter()
        .cloned()
        .collect();

    let message = if selected.is_empty() {
        "No transactions match".to_string()
    } else {
        format!("Listed {}", plural(selected.len(), "transaction", "transactions"))
    };
    let display = table(&selected, session.currency());
    Ok(Out::new(message, selected).with_display(display))
}

fn table(transactions: &[Transaction], currency: Currency) -> String {
    let recurring = transactions.iter().any(Transaction::is_recurring);
    let mut headers = vec!["Date", "Description", "Category", "Type", "Amount"];
    if recurring {
        headers.extend(["Frequency", "Next due"]);
    }
    headers.push("Id");

    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|t| {
            let mut row = vec![
                t.date().format("%m/%d/%Y").to_string(),
                t.description().to_string(),
                t.category().to_string(),
                t.kind().to_string(),
                currency.format(t.amount()),
            ];
            if recurring {
                match t.recurrence() {
                    Some(r) => {
                        row.push(r.frequency().to_string());
                        row.push(r.next_due_date().format("%m/%d/%Y").to_string());
                    }
                    None => row.extend([String::new(), String::new()]),
                }
            }
            row.push(t.id().to_string());
            row
        })
        .collect();
    render_table(&headers, &rows)
}
