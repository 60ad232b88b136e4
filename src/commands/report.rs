//! The dashboard summary and the notification check.

use crate::commands::{plural, render_table, Out, Session, Settings};
use crate::currency::Currency;
use crate::notify::Notification;
use crate::summary::{budget_status, summarize, BudgetStatus, Summary, Totals};
use crate::{Config, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: Summary,
    pub budgets: Vec<BudgetStatus>,
}

/// Totals of income and expenses over all time and this month, expenses by category and the
/// state of each budget.
pub async fn summary(config: &Config, settings: Settings) -> Result<Out<SummaryReport>> {
    let session = Session::open(config, settings).await?;
    let ledger = session.ledger();
    let report = SummaryReport {
        summary: summarize(ledger.transactions(), session.today()),
        budgets: budget_status(ledger.transactions(), ledger.budgets(), session.today()),
    };
    let balance = session.currency().format(report.summary.this_month.balance);
    let display = render(&report, session.currency());
    Ok(Out::new(format!("Balance this month: {balance}"), report).with_display(display))
}

fn render(report: &SummaryReport, currency: Currency) -> String {
    let totals = |label: &str, t: &Totals| {
        vec![
            label.to_string(),
            currency.format(t.income),
            currency.format(t.expenses),
            currency.format(t.balance),
        ]
    };
    let mut sections = vec![render_table(
        &["", "Income", "Expenses", "Balance"],
        &[
            totals("This month", &report.summary.this_month),
            totals("All time", &report.summary.all_time),
        ],
    )];

    if !report.summary.expenses_by_category.is_empty() {
        let rows: Vec<Vec<String>> = report
            .summary
            .expenses_by_category
            .iter()
            .map(|c| vec![c.category.clone(), currency.format(c.amount)])
            .collect();
        sections.push(render_table(&["Category", "Spent"], &rows));
    }

    if !report.budgets.is_empty() {
        let rows: Vec<Vec<String>> = report
            .budgets
            .iter()
            .map(|b| {
                vec![
                    b.category.clone(),
                    format!("{} of {}", currency.format(b.spent), currency.format(b.ceiling)),
                    if b.is_over() { "over" } else { "" }.to_string(),
                ]
            })
            .collect();
        sections.push(render_table(&["Budget", "This month", ""], &rows));
    }
    sections.join("\n\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Newest first.
    pub notifications: Vec<Notification>,
    /// How many were unread before the check displayed them.
    pub unread: usize,
}

/// Runs the evaluation pass and reports every notification it produced: recurring transactions
/// due within a week and budgets at 90% or more. The notifications are marked read once shown.
///
/// Notifications are listed newest first. Budget warnings are derived after the due-soon notices
/// of the same pass, so they come first.
pub async fn check(config: &Config, settings: Settings) -> Result<Out<CheckReport>> {
    let mut session = Session::open(config, settings).await?;
    let unread = session.notifications().unread_count();
    let notifications: Vec<Notification> = session
        .notifications()
        .sorted()
        .into_iter()
        .cloned()
        .collect();
    session.notifications_mut().mark_all_read();

    let display = notifications
        .iter()
        .map(|n| format!("[{}] {}", n.kind(), n.message()))
        .collect::<Vec<_>>()
        .join("\n");
    let message = match notifications.len() {
        0 => "Nothing needs your attention".to_string(),
        n => plural(n, "notification", "notifications"),
    };
    let out = Out::new(
        message,
        CheckReport {
            notifications,
            unread,
        },
    );
    Ok(if display.is_empty() {
        out
    } else {
        out.with_display(display)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Frequency;
    use crate::notify::NotificationKind;
    use crate::test::{date, expense, recurring, TestEnv};

    fn settings() -> Settings {
        Settings::new(date("2024-08-15"), Some(Currency::Usd))
    }

    #[tokio::test]
    async fn test_summary_on_seed_data() {
        let env = TestEnv::new().await;
        let out = summary(&env.config(), settings()).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.summary.this_month.income.to_fixed(), "5000.00");
        assert_eq!(report.summary.this_month.expenses.to_fixed(), "305.95");
        assert_eq!(out.message(), "Balance this month: $4,694.05");
        assert_eq!(report.summary.expenses_by_category[0].category, "Groceries");
        assert!(out.display().unwrap().contains("| This month"));
    }

    #[tokio::test]
    async fn test_check_reports_due_soon_and_budget() {
        let env = TestEnv::new().await;
        env.save_transactions(&[
            expense("a", "2024-08-02", "Market", "Groceries", "950.00"),
            recurring("r", "Streaming", Frequency::Monthly, "2024-08-19", "15.99"),
        ])
        .await;
        crate::commands::budget_add(&env.config(), settings(), "Groceries", "1000")
            .await
            .unwrap();

        let out = check(&env.config(), settings()).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.unread, 2);
        let messages: Vec<&str> = report.notifications.iter().map(|n| n.message()).collect();
        assert_eq!(
            messages,
            vec![
                "You've spent $950.00 (95%) of your $1,000.00 budget for Groceries this month.",
                "Upcoming recurring expense: \"Streaming\" of $15.99 is due on 8/19/2024.",
            ]
        );
        let warning = report
            .notifications
            .iter()
            .find(|n| n.kind() == NotificationKind::Warning)
            .unwrap();
        assert!(warning.message().starts_with("You've spent"));
        assert!(out.display().unwrap().contains("[warning] You've spent"));
    }

    #[tokio::test]
    async fn test_check_with_nothing_to_report() {
        let env = TestEnv::new().await;
        env.save_transactions(&[expense("a", "2024-08-02", "Bus", "Transport", "2.50")])
            .await;
        let out = check(&env.config(), settings()).await.unwrap();
        assert_eq!(out.message(), "Nothing needs your attention");
        assert!(out.display().is_none());
    }
}
