use crate::totals::MalformedAmount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The category used when a transaction has none.
pub const DEFAULT_CATEGORY: &str = "General";

/// One of the four accumulators that classified transactions are summed into.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Purchases,
    Payments,
    Fees,
    Credits,
}

serde_plain::derive_display_from_serialize!(Bucket);

impl Bucket {
    /// Classifies a raw transaction type, ignoring case. `credit` and `refund` both land in
    /// `Credits`. Returns `None` for anything else.
    pub fn classify(transaction_type: &str) -> Option<Bucket> {
        match transaction_type.to_lowercase().as_str() {
            "purchase" => Some(Bucket::Purchases),
            "payment" => Some(Bucket::Payments),
            "fee" => Some(Bucket::Fees),
            "credit" | "refund" => Some(Bucket::Credits),
            _ => None,
        }
    }

    /// Purchases and fees increase what the customer owes.
    pub fn is_debit(&self) -> bool {
        matches!(self, Bucket::Purchases | Bucket::Fees)
    }
}

/// A single transaction as read from the store.
///
/// The amount is kept exactly as stored and only parsed when it is needed, so that a malformed
/// value is reported instead of being coerced.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    transaction_date: NaiveDate,
    merchant_name: String,
    transaction_amount: String,
    transaction_type: String,
    category: String,
}

impl TransactionRecord {
    pub fn new(
        transaction_date: NaiveDate,
        merchant_name: impl Into<String>,
        transaction_amount: impl Into<String>,
        transaction_type: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            transaction_date,
            merchant_name: merchant_name.into(),
            transaction_amount: transaction_amount.into(),
            transaction_type: transaction_type.into(),
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        }
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    /// The amount exactly as it was stored.
    pub fn raw_amount(&self) -> &str {
        &self.transaction_amount
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Parses the stored amount as an exact decimal.
    pub fn amount(&self) -> Result<Decimal, MalformedAmount> {
        Decimal::from_str(self.transaction_amount.trim()).map_err(|e| MalformedAmount {
            value: self.transaction_amount.clone(),
            source: e,
        })
    }

    pub fn bucket(&self) -> Option<Bucket> {
        Bucket::classify(&self.transaction_type)
    }
}
