use crate::commands::Out;
use crate::currency::Currency;
use crate::store::seed_transactions;
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;
use tracing::warn;

/// Creates the data directory with its `config.json` and database, then stores the sample
/// transactions so that the first listing has something to show.
///
/// # Arguments
/// - `fintrack_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/fintrack`
/// - `currency` - The display currency to remember, if one was given.
/// - `today` - The sample transactions are dated relative to this day.
///
/// # Errors
/// - Returns an error if the directory was already initialized or any file operation fails.
pub async fn init(
    fintrack_home: &Path,
    currency: Option<Currency>,
    today: NaiveDate,
) -> Result<Out<()>> {
    let config = Config::create(fintrack_home, currency)
        .await
        .context("Unable to create the data directory and configs")?;
    if !config.store().save_transactions(&seed_transactions(today)).await {
        warn!("The sample transactions could not be saved");
    }
    Ok(format!(
        "Successfully created the fintrack directory at '{}'",
        config.root().display()
    )
    .into())
}
