//! A statement ready to be rendered: the customer, their account, the transaction lines with
//! their parsed amounts, and the totals.

use crate::model::{Account, Customer, TransactionRecord};
use crate::pdf::PdfEngine;
use crate::totals::{aggregate, MalformedAmount, TotalsError, TotalsSummary};
use crate::{render, Labels, Result};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

const FILE_PREFIX: &str = "DBS_Statement";

/// Reasons a statement cannot be assembled from otherwise valid records.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("No transactions to include in the statement")]
    NoTransactions,
    #[error(transparent)]
    MalformedAmount(#[from] MalformedAmount),
    #[error(transparent)]
    Totals(TotalsError),
}

impl From<TotalsError> for StatementError {
    fn from(e: TotalsError) -> Self {
        match e {
            TotalsError::MalformedAmount(e) => StatementError::MalformedAmount(e),
            e => StatementError::Totals(e),
        }
    }
}

/// A transaction with its amount already parsed.
#[derive(Debug, Clone)]
pub struct StatementLine {
    pub record: TransactionRecord,
    pub amount: Decimal,
}

impl StatementLine {
    /// Purchases and fees are shown as debits, everything else as credits.
    pub fn is_debit(&self) -> bool {
        self.record.bucket().is_some_and(|bucket| bucket.is_debit())
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    customer: Customer,
    account: Account,
    lines: Vec<StatementLine>,
    totals: TotalsSummary,
    date: NaiveDate,
}

impl Statement {
    /// Aggregates `transactions` and pairs each one with its parsed amount. Fails when there is
    /// nothing to print, when any stored amount is malformed, or when a total overflows.
    pub fn new(
        customer: Customer,
        account: Account,
        transactions: Vec<TransactionRecord>,
        date: NaiveDate,
    ) -> std::result::Result<Self, StatementError> {
        if transactions.is_empty() {
            return Err(StatementError::NoTransactions);
        }
        let totals = aggregate(&transactions)?;
        if totals.unclassified() > 0 {
            warn!(
                "{} transaction(s) for customer {} have a type that is not counted in any total",
                totals.unclassified(),
                customer.customer_id
            );
        }
        let lines = transactions
            .into_iter()
            .map(|record| {
                let amount = record.amount()?;
                Ok(StatementLine { record, amount })
            })
            .collect::<std::result::Result<Vec<_>, MalformedAmount>>()?;
        Ok(Self {
            customer,
            account,
            lines,
            totals,
            date,
        })
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn lines(&self) -> &[StatementLine] {
        &self.lines
    }

    pub fn totals(&self) -> &TotalsSummary {
        &self.totals
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The name offered to a browser, e.g. `DBS_Statement_John_Doe_20250314.pdf`.
    pub fn download_name(&self) -> String {
        format!(
            "{FILE_PREFIX}_{}_{}_{}.pdf",
            file_component(&self.customer.first_name),
            file_component(&self.customer.last_name),
            self.date.format("%Y%m%d")
        )
    }

    /// The name used when saving to the output directory, e.g. `DBS_Statement_42_20250314.pdf`.
    pub fn archive_name(&self) -> String {
        format!(
            "{FILE_PREFIX}_{}_{}.pdf",
            self.customer.customer_id,
            self.date.format("%Y%m%d")
        )
    }

    /// Renders the statement to HTML and converts it with `engine`.
    pub async fn to_pdf(&self, labels: &Labels, engine: &dyn PdfEngine) -> Result<Vec<u8>> {
        let html = render::statement_html(self, labels);
        debug!(
            "Rendered {} bytes of HTML for customer {}",
            html.len(),
            self.customer.customer_id
        );
        engine
            .render(&html)
            .await
            .with_context(|| {
                format!(
                    "Unable to convert the statement for customer {}",
                    self.customer.customer_id
                )
            })
    }
}

/// Keeps a name usable inside a file name and an HTTP header.
fn file_component(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
