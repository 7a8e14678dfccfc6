pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod i18n;
pub mod model;
mod pdf;
mod render;
mod server;
mod statement;
pub mod totals;
pub mod upload;
mod utils;
pub mod validate;

#[cfg(test)]
mod test;

pub use config::{Config, PdfSettings};
pub use error::Error;
pub use error::Result;
pub use i18n::{Labels, Translations};
pub use pdf::{Mode, PdfEngine};
pub use statement::{Statement, StatementError, StatementLine};
pub use totals::{aggregate, format_currency, MalformedAmount, TotalsError, TotalsSummary};
pub use validate::ValidationError;
