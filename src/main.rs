use clap::Parser;
use fintrack::args::{Args, BudgetCommand, Command};
use fintrack::commands::{self, Settings};
use fintrack::{Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let settings = Settings::new(args.common().today(), args.common().currency());

    // When FINTRACK_IN_TEST_MODE is set and non-empty the AI assistant answers locally instead of
    // calling the Gemini API.
    let mode = Mode::from_env();

    if let Command::Init = args.command() {
        commands::init(home, settings.currency, settings.today)
            .await?
            .print();
        return Ok(());
    }

    let config = Config::load(home).await?;
    match args.command() {
        Command::Init => {}
        Command::Add(a) => commands::add(&config, settings, a).await?.print(),
        Command::Update(a) => commands::update(&config, settings, a).await?.print(),
        Command::Delete(a) => commands::delete(&config, settings, a).await?.print(),
        Command::List(a) => commands::list(&config, settings, a).await?.print(),
        Command::Budget(b) => match b.command() {
            BudgetCommand::Add { category, amount } => {
                commands::budget_add(&config, settings, category, amount)
                    .await?
                    .print()
            }
            BudgetCommand::Delete { category } => {
                commands::budget_delete(&config, settings, category)
                    .await?
                    .print()
            }
            BudgetCommand::List => commands::budget_list(&config, settings).await?.print(),
        },
        Command::Summary => commands::summary(&config, settings).await?.print(),
        Command::Check => commands::check(&config, settings).await?.print(),
        Command::Export(a) => commands::export(&config, settings, a).await?.print(),
        Command::Ask(a) => commands::ask(&config, settings, mode, a).await?.print(),
    }
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over `level`, which only
/// applies to this crate.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
