use crate::commands::Out;
use crate::db::StatementData;
use crate::model::Language;
use crate::statement::{Statement, StatementError};
use crate::validate::{validate_customer_id, validate_language};
use crate::{pdf, utils, Config, Mode, Result, Translations};
use anyhow::{anyhow, bail, Context};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// What `generate` wrote.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub customer_id: i64,
    pub language: Language,
    pub path: PathBuf,
    pub transactions: usize,
    pub net_total: Decimal,
}

/// Generates a statement for one customer and saves it in the output directory as
/// `DBS_Statement_<customer_id>_<yyyymmdd>.pdf`.
///
/// # Arguments
/// - `customer_id` - The raw customer ID. When `None` the user is prompted for it on stdin.
/// - `language` - The raw language code, `en` when `None`.
/// - `limit` - How many of the most recent transactions to include. Defaults to the configured
///   transaction limit.
///
/// # Errors
/// - The customer ID or language is invalid.
/// - The customer, their account or their transactions are missing.
/// - PDF conversion or writing the file fails.
pub async fn generate(
    config: Config,
    mode: Mode,
    customer_id: Option<&str>,
    language: Option<&str>,
    limit: Option<u32>,
) -> Result<Out<GenerateReport>> {
    let raw_id = match customer_id {
        Some(id) => id.to_string(),
        None => prompt("Enter customer ID: ").await?,
    };
    let customer_id = validate_customer_id(Some(&raw_id))?;
    let language = validate_language(language)?;
    let limit = limit.unwrap_or_else(|| config.transaction_limit());
    debug!("Generating a statement for customer {customer_id} in '{language}', limit {limit}");

    let (customer, account, transactions) =
        match config.db().statement_data(customer_id, Some(limit)).await? {
            StatementData::NoCustomer => bail!("Customer not found"),
            StatementData::NoAccount(_) => bail!("No account found for this customer"),
            StatementData::Found {
                customer,
                account,
                transactions,
            } => (customer, account, transactions),
        };

    let today = Local::now().date_naive();
    let statement =
        Statement::new(customer, account, transactions, today).map_err(|e| match e {
            StatementError::NoTransactions => anyhow!("No transactions found for this customer"),
            e => anyhow::Error::new(e),
        })?;

    let engine = pdf::engine(config.pdf(), mode);
    let translations = Translations::builtin();
    let pdf = statement
        .to_pdf(translations.get(language), engine.as_ref())
        .await?;

    utils::make_dir(config.output_dir()).await?;
    let path = config.output_dir().join(statement.archive_name());
    utils::write(&path, &pdf).await?;
    info!("Wrote {} bytes to {}", pdf.len(), path.display());

    let report = GenerateReport {
        customer_id,
        language,
        path,
        transactions: statement.lines().len(),
        net_total: statement.totals().net_total(),
    };
    Ok(Out::new(
        format!("Statement saved to {}", report.path.display()),
        report,
    ))
}

/// Writes `message` to stdout and reads one line from stdin, without the line ending.
async fn prompt(message: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Unable to read the customer ID from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SAMPLE_CUSTOMER_ID;
    use crate::test::{TestEnv, NO_ACCOUNT_CUSTOMER_ID, NO_TRANSACTIONS_CUSTOMER_ID};

    #[tokio::test]
    async fn test_generate() {
        let env = TestEnv::new().await;
        let out = generate(env.config(), Mode::Test, Some("1"), Some("zh"), None)
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.customer_id, SAMPLE_CUSTOMER_ID);
        assert_eq!(report.language, Language::Zh);
        assert_eq!(report.transactions, 10);
        assert!(report.path.starts_with(env.config().output_dir()));

        let name = report.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("DBS_Statement_1_"), "{name}");
        let bytes = tokio::fs::read(&report.path).await.unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF"));
        assert!(text.contains("DBS银行信用卡对账单"));
    }

    #[tokio::test]
    async fn test_generate_with_limit() {
        let env = TestEnv::new().await;
        let out = generate(env.config(), Mode::Test, Some(" 1 "), None, Some(50))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.transactions, 12);
        assert_eq!(report.language, Language::En);
        assert_eq!(report.net_total, Decimal::new(-4530, 2));
    }

    #[tokio::test]
    async fn test_generate_errors() {
        let env = TestEnv::new().await;
        let cases = [
            (Some("abc"), None, "Customer ID must be a valid integer"),
            (Some("-4"), None, "Customer ID must be a positive integer"),
            (Some("1"), Some("de"), "Unsupported language"),
            (Some("404"), None, "Customer not found"),
        ];
        for (customer_id, language, expected) in cases {
            let err = generate(env.config(), Mode::Test, customer_id, language, None)
                .await
                .unwrap_err();
            assert!(err.to_string().contains(expected), "{err}");
        }

        let id = NO_ACCOUNT_CUSTOMER_ID.to_string();
        let err = generate(env.config(), Mode::Test, Some(&id), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No account found for this customer");

        let id = NO_TRANSACTIONS_CUSTOMER_ID.to_string();
        let err = generate(env.config(), Mode::Test, Some(&id), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No transactions found for this customer");
    }

    #[tokio::test]
    async fn test_generate_total_overflow() {
        let env = TestEnv::new().await;
        let max = Decimal::MAX.to_string();
        env.insert_raw_transaction(NO_TRANSACTIONS_CUSTOMER_ID, &max).await;
        env.insert_raw_transaction(NO_TRANSACTIONS_CUSTOMER_ID, &max).await;
        let id = NO_TRANSACTIONS_CUSTOMER_ID.to_string();
        let err = generate(env.config(), Mode::Test, Some(&id), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The purchases total is too large to represent");
    }
}
