//! Command handlers for the fintrack CLI.
//!
//! Every handler loads the ledger, runs the evaluation pass, does its work and writes back what
//! changed. The result is an `Out` that the caller prints.

mod ask;
mod budget;
mod export;
mod init;
mod report;
mod transactions;

use crate::currency::Currency;
use crate::ledger::Ledger;
use crate::notify::{NotificationDraft, NotificationKind, NotificationStore};
use crate::store::Store;
use crate::{Config, Result};
use chrono::NaiveDate;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use ask::ask;
pub use budget::{budget_add, budget_delete, budget_list};
pub use export::{export, ExportReport};
pub use init::init;
pub use report::{check, summary, CheckReport, SummaryReport};
pub use transactions::{add, delete, list, update};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// A rendering of the data meant for standard output, such as a table of transactions.
    #[serde(skip)]
    display: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            display: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            display: None,
        }
    }

    /// Attach text to be written to standard output.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Print the display text to stdout, the message to `info!` and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(display) = self.display() {
            println!("{display}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Values every command needs besides its own arguments.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// The calendar day the command runs on.
    pub today: NaiveDate,
    /// The display currency requested on the command line, if any.
    pub currency: Option<Currency>,
}

impl Settings {
    pub fn new(today: NaiveDate, currency: Option<Currency>) -> Self {
        Self { today, currency }
    }
}

/// The state of one command invocation.
///
/// Opening a session loads the ledger and runs the evaluation pass once. After a command mutates
/// the ledger it calls `commit`, which evaluates again and persists the result.
pub(crate) struct Session {
    store: Store,
    ledger: Ledger,
    notifications: NotificationStore,
    today: NaiveDate,
    currency: Currency,
}

impl Session {
    pub(crate) async fn open(config: &Config, settings: Settings) -> Result<Self> {
        let store = config.store();
        let ledger = store.load_ledger(settings.today).await;
        let mut session = Self {
            store,
            ledger,
            notifications: NotificationStore::new(),
            today: settings.today,
            currency: config.resolve_currency(settings.currency),
        };
        let (dirty, notices) = session.evaluate()?;
        if dirty && !session.store.save_ledger(&session.ledger).await {
            warn!("Updated due dates could not be saved");
        }
        for n in &notices {
            debug!("{}", n.message);
        }
        Ok(session)
    }

    /// Runs the evaluation pass. Returns whether any due date moved along with the notices that
    /// were new to this session.
    fn evaluate(&mut self) -> Result<(bool, Vec<NotificationDraft>)> {
        let evaluation = self.ledger.evaluate(self.today, self.currency)?;
        if evaluation.is_dirty() {
            debug!(
                "{} recurring transaction(s) rolled forward",
                evaluation.rolled().len()
            );
        }
        let added = evaluation
            .notices()
            .iter()
            .filter(|n| self.notifications.add((*n).clone()))
            .cloned()
            .collect();
        Ok((evaluation.is_dirty(), added))
    }

    /// Saves the ledger, re-evaluates it and announces any notices the change produced.
    pub(crate) async fn commit(&mut self) -> Result<()> {
        let (_, notices) = self.evaluate()?;
        if !self.store.save_ledger(&self.ledger).await {
            warn!("Your changes could not be saved, see the errors above");
        }
        for n in notices {
            match n.kind {
                NotificationKind::Info => info!("{}", n.message),
                NotificationKind::Warning => warn!("{}", n.message),
            }
        }
        Ok(())
    }

    pub(crate) fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub(crate) fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub(crate) fn notifications_mut(&mut self) -> &mut NotificationStore {
        &mut self.notifications
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    pub(crate) fn currency(&self) -> Currency {
        self.currency
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}

/// Renders `rows` as a markdown table with `headers`.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_header(headers.to_vec())
        .add_rows(rows.iter().cloned());
    table.to_string()
}
