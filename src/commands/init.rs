use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the statement home directory with:
/// - an initial `config.json` with default settings
/// - the PDF output directory
/// - the SQLite database, migrated to the current schema
///
/// When `sample_data` is true a demonstration customer is added to the new database.
///
/// # Errors
/// - Returns an error if the directory was already initialized or if any file operation fails.
pub async fn init(statement_home: &Path, sample_data: bool) -> Result<Out<()>> {
    let config = Config::create(statement_home)
        .await
        .context("Unable to create the statement home directory and config")?;
    let home = config.root().display();
    if !sample_data {
        return Ok(format!("Successfully created the statement home directory at {home}").into());
    }
    let customer_id = config
        .db()
        .insert_sample_data()
        .await
        .context("Unable to add the sample data")?;
    Ok(format!(
        "Successfully created the statement home directory at {home} with sample customer \
         {customer_id}"
    )
    .into())
}
