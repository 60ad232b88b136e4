//! The AI assistant.
//!
//! A question and the user's transactions are sent to a language model and its answer is returned
//! as markdown text. The assistant never fails: a missing API key and any error along the way are
//! turned into fixed messages for the user, with the details going to the log.

mod canned;
mod gemini;

pub use canned::CannedInsight;
pub use gemini::GeminiClient;

use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, error, warn};

pub const API_KEY_ENV: &str = "FINTRACK_API_KEY";
pub const TEST_MODE_ENV: &str = "FINTRACK_IN_TEST_MODE";

pub const NOT_CONFIGURED: &str = "API Key is not configured. Please set the FINTRACK_API_KEY \
environment variable to use the AI assistant.";

pub const APOLOGY: &str = "Sorry, I encountered an error trying to analyze your data. Please \
check the console for more details.";

/// Selects the backend that answers questions.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Send questions to the configured model endpoint.
    #[default]
    Live,
    /// Answer locally without any network access.
    Test,
}

impl Mode {
    /// `Mode::Test` when `FINTRACK_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// What is sent to a model: standing instructions plus the user's prompt.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InsightRequest {
    pub system_instruction: String,
    pub prompt: String,
}

/// A language model that can answer a prompt.
#[async_trait::async_trait]
pub trait Insight: Send + Sync {
    async fn generate(&self, request: &InsightRequest) -> Result<String>;
}

pub fn system_instruction(today: NaiveDate) -> String {
    format!(
        "You are a friendly and insightful financial assistant named Gemini. \
        Analyze the user's transaction data to answer their questions and provide helpful advice. \
        The transaction data is provided in JSON format. All amounts are in USD. \
        Be concise and clear in your responses. Format your response using markdown for better \
        readability, including lists, bold text, and italics where appropriate. \
        Today's date is {}.",
        today.format("%-m/%-d/%Y")
    )
}

pub fn user_prompt(question: &str, transactions: &[Transaction]) -> Result<String> {
    let json = serde_json::to_string_pretty(transactions)
        .context("Unable to serialize transactions for the assistant")?;
    Ok(format!(
        "User Question: \"{question}\"\n\nMy recent transactions (JSON):\n{json}\n"
    ))
}

pub struct Assistant {
    backend: Option<Box<dyn Insight>>,
}

impl Assistant {
    /// An assistant backed by `backend`. `None` means no API key is available.
    pub fn new(backend: Option<Box<dyn Insight>>) -> Self {
        Self { backend }
    }

    /// Picks the backend for `mode`. In live mode the API key is read from `FINTRACK_API_KEY` and
    /// the model and endpoint come from `config`.
    pub fn from_config(config: &Config, mode: Mode) -> Self {
        let backend: Option<Box<dyn Insight>> = match mode {
            Mode::Test => {
                debug!("Using the canned assistant because {TEST_MODE_ENV} is set");
                Some(Box::new(CannedInsight))
            }
            Mode::Live => match std::env::var(API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => Some(Box::new(GeminiClient::new(
                    config.ai_endpoint(),
                    config.ai_model(),
                    key.trim(),
                ))),
                _ => None,
            },
        };
        Self::new(backend)
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Answers `question` about `transactions`. Always returns text for the user.
    pub async fn ask(&self, question: &str, transactions: &[Transaction], today: NaiveDate) -> String {
        let Some(backend) = self.backend.as_ref() else {
            warn!("{API_KEY_ENV} is not set, the AI assistant is unavailable");
            return NOT_CONFIGURED.to_string();
        };
        match self.ask_inner(backend.as_ref(), question, transactions, today).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Error calling the AI assistant: {e:#}");
                APOLOGY.to_string()
            }
        }
    }

    async fn ask_inner(
        &self,
        backend: &dyn Insight,
        question: &str,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> Result<String> {
        let request = InsightRequest {
            system_instruction: system_instruction(today),
            prompt: user_prompt(question, transactions)?,
        };
        debug!(
            "Asking the assistant about {} transactions ({} prompt bytes)",
            transactions.len(),
            request.prompt.len()
        );
        backend.generate(&request).await
    }
}
