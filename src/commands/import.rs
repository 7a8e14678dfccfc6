use crate::commands::Out;
use crate::upload::{is_valid_file_size, parse_upload, HighValueRow, UploadError};
use crate::{format_currency, utils, Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// What `import` stored.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub account_id: i64,
    pub imported: u64,
    /// Rows above the high value threshold. They are imported like any other row.
    pub high_value: Vec<HighValueRow>,
}

/// Imports the transactions in a CSV file into an existing account. The file is checked in full
/// before anything is written, and either every row is stored or none are.
pub async fn import(config: Config, account_id: i64, file: &Path) -> Result<Out<ImportReport>> {
    if config.db().account(account_id).await?.is_none() {
        bail!("Account {account_id} does not exist");
    }
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = tokio::fs::metadata(file)
        .await
        .with_context(|| format!("Failed to read file at {}", file.display()))?
        .len();
    if !is_valid_file_size(size) {
        return Err(UploadError::TooLarge { size })
            .with_context(|| format!("Unable to import '{}'", file.display()));
    }
    let bytes = utils::read_bytes(file).await?;
    let parsed = parse_upload(&filename, &bytes)
        .with_context(|| format!("Unable to import '{}'", file.display()))?;

    for row in &parsed.high_value {
        warn!(
            "Row {} is a high value transaction: {} at {}",
            row.row,
            format_currency(row.amount),
            row.merchant_name
        );
    }
    let imported = config
        .db()
        .insert_transactions(account_id, &parsed.transactions)
        .await?;

    let report = ImportReport {
        account_id,
        imported,
        high_value: parsed.high_value,
    };
    Ok(Out::new(
        format!("Imported {imported} transaction(s) into account {account_id}"),
        report,
    ))
}
