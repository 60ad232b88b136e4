//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and holds the preferred display
//! currency and the settings for the AI assistant. The ledger itself lives next to it in
//! `$FINTRACK_HOME/fintrack.sqlite`.

use crate::currency::Currency;
use crate::db::Db;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const FINTRACK_SQLITE: &str = "fintrack.sqlite";
pub(crate) const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";
pub(crate) const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json` and opens the
/// database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, writes an initial `config.json` and creates the database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/fintrack`
    /// - `currency` - The display currency to save, if the user chose one.
    ///
    /// # Errors
    /// - Returns an error if the directory has already been initialized or any file operation
    ///   fails.
    pub async fn create(dir: impl Into<PathBuf>, currency: Option<Currency>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "fintrack has already been initialized in '{}'",
                root.display()
            );
        }

        let config_file = ConfigFile {
            currency,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(FINTRACK_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        debug!("Initialized fintrack home at {}", root.display());
        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// Validates that the home directory and its config file exist, loads the config file and
    /// opens the database.
    pub async fn load(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fintrack_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fintrack home directory is missing, run 'fintrack init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'fintrack init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(FINTRACK_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// The display currency saved in `config.json`, if any.
    pub fn currency(&self) -> Option<Currency> {
        self.config_file.currency
    }

    /// Decides the display currency: an explicit choice wins, then the saved preference, then the
    /// locale of the environment.
    pub fn resolve_currency(&self, explicit: Option<Currency>) -> Currency {
        explicit
            .or(self.config_file.currency)
            .unwrap_or_else(Currency::detect)
    }

    pub fn ai_model(&self) -> &str {
        &self.config_file.ai_model
    }

    pub fn ai_endpoint(&self) -> &str {
        &self.config_file.ai_endpoint
    }

    pub fn store(&self) -> Store {
        Store::new(self.db.clone())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "currency": "EUR",
///   "ai_model": "gemini-2.5-flash",
///   "ai_endpoint": "https://generativelanguage.googleapis.com"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    config_version: u8,

    /// Preferred display currency. Detected from the locale when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<Currency>,

    #[serde(default = "default_ai_model")]
    ai_model: String,

    /// Base URL of the Gemini API
    #[serde(default = "default_ai_endpoint")]
    ai_endpoint: String,
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_endpoint() -> String {
    DEFAULT_AI_ENDPOINT.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency: None,
            ai_model: default_ai_model(),
            ai_endpoint: default_ai_endpoint(),
        }
    }
}

impl ConfigFile {
    /// Loads and validates a `ConfigFile` from `path`.
    async fn load(path: &Path) -> Result<Self> {
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
