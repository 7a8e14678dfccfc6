//! These structs provide the CLI interface for the statement CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// statement: Generates credit card statements as PDF files.
///
/// Customers, accounts and transactions are kept in a local SQLite database. A statement can be
/// written to disk with the generate subcommand, or downloaded from the HTTP service started with
/// the serve subcommand. Statements are available in English, Chinese, Malay and Tamil.
///
/// PDF conversion is done by an external HTML to PDF program, weasyprint by default. See the
/// config.json file in the statement home directory to change it.
#[derive(Debug, Parser, Clone)]
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
    /// Create the statement home directory, its config file and the database.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/statements; pass --statement-home to put it somewhere else. Use --sample-data to add
    /// a demonstration customer so that the other commands have something to work with.
    Init(InitArgs),
    /// Generate a PDF statement for one customer and save it to the output directory.
    Generate(GenerateArgs),
    /// Run the HTTP service that offers statements for download.
    Serve(ServeArgs),
    /// Import transactions for an account from a CSV file.
    Import(ImportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter docs for the
    /// syntax.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the database and configuration are held. Defaults to ~/statements
    #[arg(long, env = "STATEMENT_HOME", default_value_t = default_statement_home())]
    statement_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, statement_home: PathBuf) -> Self {
        Self {
            log_level,
            statement_home: statement_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn statement_home(&self) -> &DisplayPath {
        &self.statement_home
    }
}

/// (Not shown): Args for the `statement init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Add a demonstration customer (ID 1) with an account and a month of transactions.
    #[arg(long)]
    sample_data: bool,
}

impl InitArgs {
    pub fn new(sample_data: bool) -> Self {
        Self { sample_data }
    }

    pub fn sample_data(&self) -> bool {
        self.sample_data
    }
}

/// (Not shown): Args for the `statement generate` command.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// The customer to generate a statement for. You are prompted for it when it is not given.
    #[arg(long)]
    customer_id: Option<String>,

    /// The statement language: en, zh, ms or ta. Defaults to en.
    #[arg(long)]
    language: Option<String>,

    /// The number of most recent transactions to include. Defaults to transaction_limit in
    /// config.json.
    #[arg(long)]
    limit: Option<u32>,
}

impl GenerateArgs {
    pub fn new(customer_id: Option<String>, language: Option<String>, limit: Option<u32>) -> Self {
        Self {
            customer_id,
            language,
            limit,
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// (Not shown): Args for the `statement serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on, e.g. 0.0.0.0:8080. Defaults to listen in config.json.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

impl ServeArgs {
    pub fn new(listen: Option<SocketAddr>) -> Self {
        Self { listen }
    }

    pub fn listen(&self) -> Option<SocketAddr> {
        self.listen
    }
}

/// (Not shown): Args for the `statement import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The account the transactions belong to.
    #[arg(long)]
    account_id: i64,

    /// A CSV file with the columns transaction_date, merchant_name, transaction_amount,
    /// transaction_type and, optionally, category.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(account_id: i64, file: impl Into<PathBuf>) -> Self {
        Self {
            account_id,
            file: file.into(),
        }
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

fn default_statement_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("statements"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --statement-home or STATEMENT_HOME instead of relying on the \
                default statement home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("statements")
        }
    })
}

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
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
