//! These structs provide the CLI interface for the fintrack CLI.

use crate::currency::Currency;
use crate::filter::{SortKey, SortOrder, TransactionFilter};
use crate::model::{Frequency, TransactionType};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: A command-line personal finance tracker.
///
/// Record income and expenses, set monthly budgets per category and get reminded about recurring
/// payments that are coming due and budgets that are nearly used up. Amounts are stored in USD and
/// shown in the display currency of your choice.
///
/// The `ask` command sends your question and your transactions to Google's Gemini API. It needs an
/// API key in the FINTRACK_API_KEY environment variable.
#[derive(Debug, Parser, Clone)]
#[command(name = "fintrack", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// Run this once before anything else. The directory defaults to $HOME/fintrack; pass --home
    /// or set FINTRACK_HOME to put it elsewhere. A --currency given here is saved as your
    /// preferred display currency.
    Init,
    /// Add a transaction.
    Add(AddArgs),
    /// Change an existing transaction. Fields that are not given keep their current values.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List transactions, newest first by default.
    List(ListArgs),
    /// Manage monthly budgets.
    Budget(BudgetArgs),
    /// Show income, expense and balance totals along with budget usage.
    Summary,
    /// Roll recurring transactions forward and show the resulting notifications.
    Check,
    /// Write the listed transactions to a CSV file.
    Export(ExportArgs),
    /// Ask the AI assistant a question about your transactions.
    Ask(AskArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    home: DisplayPath,

    /// The currency amounts are shown and entered in, e.g. USD, EUR, JPY, GBP, CAD, AUD or INR.
    /// Defaults to the saved preference, then to the currency of your locale.
    #[arg(long, env = "FINTRACK_CURRENCY")]
    currency: Option<Currency>,

    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(long, hide = true)]
    today: Option<NaiveDate>,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
            currency: None,
            today: None,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    /// The `--today` override, or the local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Args for the `fintrack add` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct AddArgs {
    #[arg(long, short)]
    description: String,

    /// The amount in the display currency, e.g. 42.50
    #[arg(long, short, allow_hyphen_values = true)]
    amount: String,

    #[arg(long, short)]
    category: String,

    #[arg(long = "type", short = 't', value_enum, default_value_t = TransactionType::Expense)]
    kind: TransactionType,

    /// The date of the transaction (YYYY-MM-DD). Defaults to today. For a recurring transaction
    /// this is the start date and may be in the future.
    #[arg(long)]
    date: Option<String>,

    /// Make this a recurring transaction with the given frequency.
    #[arg(long, value_enum)]
    recurring: Option<Frequency>,
}

impl AddArgs {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            kind,
            date: None,
            recurring: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_recurring(mut self, frequency: Frequency) -> Self {
        self.recurring = Some(frequency);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn recurring(&self) -> Option<Frequency> {
        self.recurring
    }
}

/// Args for the `fintrack update` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct UpdateArgs {
    /// The id of the transaction to change.
    id: String,

    #[arg(long, short)]
    description: Option<String>,

    /// The new amount in the display currency.
    #[arg(long, short, allow_hyphen_values = true)]
    amount: Option<String>,

    #[arg(long, short)]
    category: Option<String>,

    #[arg(long = "type", short = 't', value_enum)]
    kind: Option<TransactionType>,

    #[arg(long)]
    date: Option<String>,

    /// Make the transaction recurring with this frequency.
    #[arg(long, value_enum, conflicts_with = "once")]
    recurring: Option<Frequency>,

    /// Make a recurring transaction a one-off.
    #[arg(long)]
    once: bool,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_recurring(mut self, frequency: Frequency) -> Self {
        self.recurring = Some(frequency);
        self
    }

    pub fn with_once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn kind(&self) -> Option<TransactionType> {
        self.kind
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn recurring(&self) -> Option<Frequency> {
        self.recurring
    }

    pub fn once(&self) -> bool {
        self.once
    }
}

/// Args for the `fintrack delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Selection and ordering shared by `list` and `export`.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct FilterArgs {
    /// Only income or only expenses.
    #[arg(long = "type", short = 't', value_enum)]
    kind: Option<TransactionType>,

    /// Only this category.
    #[arg(long, short)]
    category: Option<String>,

    /// Only transactions whose description contains this text (case-insensitive).
    #[arg(long, short)]
    search: Option<String>,

    #[arg(long, value_enum, default_value_t = SortKey::Date)]
    sort: SortKey,

    #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
    order: SortOrder,

    /// Select recurring transactions instead of one-off transactions.
    #[arg(long)]
    recurring: bool,
}

impl FilterArgs {
    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn with_recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            kind: self.kind,
            category: self.category.clone(),
            search: self.search.clone(),
            recurring: self.recurring,
        }
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

/// Args for the `fintrack list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    #[clap(flatten)]
    filter: FilterArgs,
}

impl ListArgs {
    pub fn new(filter: FilterArgs) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }
}

/// Args for the `fintrack export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Where to write the CSV file. Defaults to transactions_YYYY-MM-DD.csv in the current
    /// directory.
    #[arg(long, short)]
    out: Option<PathBuf>,

    #[clap(flatten)]
    filter: FilterArgs,
}

impl ExportArgs {
    pub fn new(out: Option<PathBuf>, filter: FilterArgs) -> Self {
        Self { out, filter }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }
}

/// Args for the `fintrack ask` command.
#[derive(Debug, Parser, Clone)]
pub struct AskArgs {
    /// The question, e.g. "Where did most of my money go this month?"
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,
}

impl AskArgs {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: vec![question.into()],
        }
    }

    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}

/// Args for the `fintrack budget` command.
#[derive(Debug, Parser, Clone)]
pub struct BudgetArgs {
    #[command(subcommand)]
    command: BudgetCommand,
}

impl BudgetArgs {
    pub fn new(command: BudgetCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &BudgetCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BudgetCommand {
    /// Set a monthly spending limit for an expense category.
    Add {
        category: String,
        /// The monthly limit in the display currency.
        amount: String,
    },
    /// Remove the budget for a category (or with the given id).
    Delete { category: String },
    /// Show every budget with this month's spending.
    List,
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or FINTRACK_HOME instead of relying on the default \
                fintrack home directory.",
            );
            PathBuf::from("fintrack")
        }
    })
}

/// A path that can be used as a clap default value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "fintrack",
            "--home",
            "/tmp/ft",
            "--currency",
            "eur",
            "add",
            "-d",
            "Coffee",
            "-a",
            "3.20",
            "-c",
            "Dining Out",
            "--recurring",
            "weekly",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/ft"));
        assert_eq!(args.common().currency(), Some(Currency::Eur));
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.description(), "Coffee");
        assert_eq!(add.kind(), TransactionType::Expense);
        assert_eq!(add.recurring(), Some(Frequency::Weekly));
        assert_eq!(add.date(), None);
    }

    #[test]
    fn test_parse_update_once_conflicts_with_recurring() {
        let ok = Args::try_parse_from(["fintrack", "update", "abc", "--once"]).unwrap();
        let Command::Update(update) = ok.command() else {
            panic!("expected update");
        };
        assert!(update.once());
        assert_eq!(update.id(), "abc");

        let err = Args::try_parse_from([
            "fintrack", "update", "abc", "--once", "--recurring", "monthly",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_list_and_budget() {
        let args = Args::try_parse_from([
            "fintrack", "list", "--type", "income", "--sort", "amount", "--order", "asc",
        ])
        .unwrap();
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.filter().filter().kind, Some(TransactionType::Income));
        assert_eq!(list.filter().sort(), SortKey::Amount);
        assert_eq!(list.filter().order(), SortOrder::Asc);

        let args = Args::try_parse_from(["fintrack", "budget", "add", "Groceries", "400"]).unwrap();
        let Command::Budget(budget) = args.command() else {
            panic!("expected budget");
        };
        assert!(matches!(
            budget.command(),
            BudgetCommand::Add { category, amount } if category == "Groceries" && amount == "400"
        ));
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let args = Args::try_parse_from(["fintrack", "ask", "how", "much", "on", "food?"]).unwrap();
        let Command::Ask(ask) = args.command() else {
            panic!("expected ask");
        };
        assert_eq!(ask.question(), "how much on food?");
    }

    #[test]
    fn test_hidden_today() {
        let args = Args::try_parse_from(["fintrack", "--today", "2024-08-15", "check"]).unwrap();
        assert_eq!(
            args.common().today(),
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
        );
    }
}
