use crate::args::AskArgs;
use crate::commands::{plural, Out, Session, Settings};
use crate::insight::{Assistant, Mode};
use crate::model::Transaction;
use crate::{Config, Result};

/// Sends the question together with the one-off transactions to the AI assistant and shows its
/// answer. The assistant's problems never fail the command; they come back as the answer text.
pub async fn ask(
    config: &Config,
    settings: Settings,
    mode: Mode,
    args: &AskArgs,
) -> Result<Out<String>> {
    let session = Session::open(config, settings).await?;
    let transactions: Vec<Transaction> = session
        .ledger()
        .transactions()
        .iter()
        .filter(|t| !t.is_recurring())
        .cloned()
        .collect();

    let assistant = Assistant::from_config(config, mode);
    let answer = assistant
        .ask(&args.question(), &transactions, session.today())
        .await;
    let message = if assistant.is_configured() {
        format!(
            "Asked about {}",
            plural(transactions.len(), "transaction", "transactions")
        )
    } else {
        "The AI assistant is not configured".to_string()
    };
    Ok(Out::new(message, answer.clone()).with_display(answer))
}
