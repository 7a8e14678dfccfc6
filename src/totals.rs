//! Statement totals and currency formatting.
//!
//! Everything here is pure: the aggregator allocates its own accumulators and returns a fresh
//! `TotalsSummary`, so it can be called from any number of requests at once.

use crate::model::{Bucket, TransactionRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// A transaction amount that is not a well-formed decimal. This is a fault in the stored data,
/// not in anything the user typed, and it aborts the statement it was found in.
#[derive(Debug, Error)]
#[error("Malformed transaction amount '{value}'")]
pub struct MalformedAmount {
    /// The stored text that failed to parse.
    pub value: String,
    #[source]
    pub source: rust_decimal::Error,
}

/// Reasons `aggregate` cannot produce a summary.
#[derive(Debug, Error)]
pub enum TotalsError {
    #[error(transparent)]
    MalformedAmount(#[from] MalformedAmount),
    /// A bucket or the net total does not fit in a `Decimal`.
    #[error("The {0} total is too large to represent")]
    Overflow(String),
}

/// The four bucket totals of a statement. The net total is always derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsSummary {
    purchases: Decimal,
    payments: Decimal,
    fees: Decimal,
    credits: Decimal,
    net_total: Decimal,
    /// Transactions whose type matched no bucket. They do not affect any total.
    unclassified: usize,
}

impl Default for TotalsSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl TotalsSummary {
    /// All buckets at `0.00`.
    pub fn new() -> Self {
        let zero = Decimal::new(0, 2);
        Self {
            purchases: zero,
            payments: zero,
            fees: zero,
            credits: zero,
            net_total: zero,
            unclassified: 0,
        }
    }

    pub fn purchases(&self) -> Decimal {
        self.purchases
    }

    pub fn payments(&self) -> Decimal {
        self.payments
    }

    pub fn fees(&self) -> Decimal {
        self.fees
    }

    pub fn credits(&self) -> Decimal {
        self.credits
    }

    pub fn unclassified(&self) -> usize {
        self.unclassified
    }

    pub fn get(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Purchases => self.purchases,
            Bucket::Payments => self.payments,
            Bucket::Fees => self.fees,
            Bucket::Credits => self.credits,
        }
    }

    /// `purchases + fees - payments - credits`
    pub fn net_total(&self) -> Decimal {
        self.net_total
    }

    fn add(&mut self, bucket: Bucket, amount: Decimal) -> Result<(), TotalsError> {
        let total = match bucket {
            Bucket::Purchases => &mut self.purchases,
            Bucket::Payments => &mut self.payments,
            Bucket::Fees => &mut self.fees,
            Bucket::Credits => &mut self.credits,
        };
        *total = total
            .checked_add(amount)
            .ok_or_else(|| TotalsError::Overflow(bucket.to_string()))?;
        Ok(())
    }

    /// Computes the net total as `(purchases - payments) + (fees - credits)`.
    fn settle(&mut self) -> Result<(), TotalsError> {
        let overflow = || TotalsError::Overflow("net".to_string());
        let spent = self.purchases.checked_sub(self.payments).ok_or_else(overflow)?;
        let charged = self.fees.checked_sub(self.credits).ok_or_else(overflow)?;
        self.net_total = spent.checked_add(charged).ok_or_else(overflow)?;
        Ok(())
    }
}

/// Sums `transactions` into their buckets.
///
/// Every amount is parsed before its type is looked at, so a malformed amount fails the whole
/// call even on a transaction that would not have been counted. Transactions with an
/// unrecognized type are skipped and counted in `unclassified`. A bucket or net total beyond
/// the range of `Decimal` is an error rather than a panic.
pub fn aggregate<'a, I>(transactions: I) -> Result<TotalsSummary, TotalsError>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut totals = TotalsSummary::new();
    for transaction in transactions {
        let amount = transaction.amount()?;
        match transaction.bucket() {
            Some(bucket) => totals.add(bucket, amount)?,
            None => totals.unclassified += 1,
        }
    }
    totals.settle()?;
    Ok(totals)
}

/// Formats `amount` as dollars with thousands separators and two decimal places, rounding half
/// to even. Negative amounts put the minus sign before the dollar sign: `-$1,234.56`.
pub fn format_currency(amount: Decimal) -> String {
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    let mut cents = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    cents.rescale(2);
    let text = cents.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
