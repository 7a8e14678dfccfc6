//! Configuration file handling.
//!
//! The configuration file is stored at `$STATEMENT_HOME/config.json`. It names the SQLite
//! database, the directory that generated PDFs are written to, the address the HTTP service
//! listens on, and the external program used to produce PDFs.

use crate::db::Db;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

const APP_NAME: &str = "statement";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STATEMENT_SQLITE: &str = "statement.sqlite";
const OUTPUT_DIR: &str = "pdfs";
const TRANSACTION_LIMIT: u32 = 10;
const PDF_PROGRAM: &str = "weasyprint";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$STATEMENT_HOME` and from there it loads `$STATEMENT_HOME/config.json`. Paths in
/// the file are resolved against the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
    output_dir: PathBuf,
}

impl Config {
    /// Creates the home directory and:
    /// - writes an initial `config.json` with default settings
    /// - creates the PDF output directory
    /// - creates and migrates the SQLite database
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the statement home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists at '{}'",
                config_path.display()
            );
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let output_dir = utils::resolve(&root, &config_file.output_dir);
        utils::make_dir(&output_dir).await?;

        let sqlite_path = utils::resolve(&root, &config_file.sqlite_path);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
            output_dir,
        })
    }

    /// This will
    /// - validate that the home directory exists
    /// - load the config file, or fall back to defaults with a warning if there is none
    /// - open the SQLite database
    pub async fn load(statement_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = statement_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The statement home directory is missing, run 'statement init' first")?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            warn!(
                "The config file '{}' is missing, using default settings",
                config_path.display()
            );
            ConfigFile::default()
        };

        let sqlite_path = utils::resolve(&root, &config_file.sqlite_path);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;
        let output_dir = utils::resolve(&root, &config_file.output_dir);

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
            output_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// Where the CLI writes generated statements.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn listen(&self) -> SocketAddr {
        self.config_file.listen
    }

    /// How many of the most recent transactions the CLI puts on a statement.
    pub fn transaction_limit(&self) -> u32 {
        self.config_file.transaction_limit
    }

    pub fn pdf(&self) -> &PdfSettings {
        &self.config_file.pdf
    }
}

/// The external program that converts HTML to PDF. It is called as `program [args..] - -` with
/// the HTML on stdin and must write the PDF to stdout.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct PdfSettings {
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            program: PDF_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "statement",
///   "config_version": 1,
///   "listen": "127.0.0.1:5000",
///   "output_dir": "pdfs",
///   "sqlite_path": "statement.sqlite",
///   "transaction_limit": 10,
///   "pdf": {
///     "program": "weasyprint"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "statement"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default = "default_listen")]
    listen: SocketAddr,

    /// Relative to the home directory unless absolute
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,

    /// Relative to the home directory unless absolute
    #[serde(default = "default_sqlite_path")]
    sqlite_path: PathBuf,

    #[serde(default = "default_transaction_limit")]
    transaction_limit: u32,

    #[serde(default)]
    pdf: PdfSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            listen: default_listen(),
            output_dir: default_output_dir(),
            sqlite_path: default_sqlite_path(),
            transaction_limit: default_transaction_limit(),
            pdf: PdfSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.transaction_limit > 0,
            "Invalid transaction_limit in config file: must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(OUTPUT_DIR)
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from(STATEMENT_SQLITE)
}

fn default_transaction_limit() -> u32 {
    TRANSACTION_LIMIT
}
