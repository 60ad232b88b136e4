//! Commands for monthly category budgets.

use crate::commands::{plural, render_table, Out, Session, Settings};
use crate::currency::Currency;
use crate::model::Budget;
use crate::summary::{budget_status, BudgetStatus};
use crate::{Config, Result};
use rust_decimal::RoundingStrategy;

/// Adds a monthly budget for `category`. `amount` is read in the display currency.
///
/// # Errors
/// - The category already has a budget, the category is empty or the amount is not positive.
pub async fn budget_add(
    config: &Config,
    settings: Settings,
    category: &str,
    amount: &str,
) -> Result<Out<Budget>> {
    let mut session = Session::open(config, settings).await?;
    let currency = session.currency();
    let budget = session.ledger_mut().add_budget(category, amount, currency)?;
    session.commit().await?;
    Ok(Out::new(
        format!(
            "Added a monthly budget of {} for {}",
            currency.format(budget.amount()),
            budget.category()
        ),
        budget,
    ))
}

/// Removes the budget for `category`. A budget id is accepted as well.
pub async fn budget_delete(
    config: &Config,
    settings: Settings,
    category: &str,
) -> Result<Out<Budget>> {
    let mut session = Session::open(config, settings).await?;
    let removed = session.ledger_mut().delete_budget(category)?;
    session.commit().await?;
    Ok(Out::new(
        format!("Deleted the budget for {}", removed.category()),
        removed,
    ))
}

/// Shows every budget with what has been spent against it this month.
pub async fn budget_list(config: &Config, settings: Settings) -> Result<Out<Vec<BudgetStatus>>> {
    let session = Session::open(config, settings).await?;
    let ledger = session.ledger();
    let statuses = budget_status(ledger.transactions(), ledger.budgets(), session.today());
    if statuses.is_empty() {
        return Ok(Out::new("No budgets have been set", statuses));
    }
    let over = statuses.iter().filter(|s| s.is_over()).count();
    let mut message = format!("Listed {}", plural(statuses.len(), "budget", "budgets"));
    if over > 0 {
        message.push_str(&format!(", {over} over the limit"));
    }
    let display = table(&statuses, session.currency());
    Ok(Out::new(message, statuses).with_display(display))
}

fn table(statuses: &[BudgetStatus], currency: Currency) -> String {
    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|s| {
            let percent = match s.percent {
                Some(p) => format!(
                    "{}%",
                    p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .normalize()
                ),
                None => "-".to_string(),
            };
            vec![
                s.category.clone(),
                currency.format(s.ceiling),
                currency.format(s.spent),
                percent,
                currency.format(s.remaining),
            ]
        })
        .collect();
    render_table(&["Category", "Budget", "Spent", "Used", "Remaining"], &rows)
}
