use crate::args::ExportArgs;
use crate::commands::{plural, Out, Session, Settings};
use crate::export::{default_file_name, write_csv};
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes the one-off transactions that pass the filters in `args` to a CSV file, in the order
/// they would be listed. Recurring transactions are never exported.
///
/// # Errors
/// - Returns an error if nothing matches or the file cannot be written.
pub async fn export(
    config: &Config,
    settings: Settings,
    args: &ExportArgs,
) -> Result<Out<ExportReport>> {
    let session = Session::open(config, settings).await?;
    let filter_args = args.filter();
    let mut filter = filter_args.filter();
    filter.recurring = false;
    let selected = filter.apply(
        session.ledger().transactions(),
        filter_args.sort(),
        filter_args.order(),
    );

    let path = args
        .out()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_file_name(session.today())));
    let rows = write_csv(&path, selected).await?;
    Ok(Out::new(
        format!(
            "Exported {} to '{}'",
            plural(rows, "transaction", "transactions"),
            path.display()
        ),
        ExportReport { path, rows },
    ))
}
