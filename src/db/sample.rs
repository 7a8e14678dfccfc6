//! A demonstration customer for trying the program out and for tests.

use super::Db;
use crate::model::{Account, Customer, TransactionRecord};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

pub(crate) const SAMPLE_CUSTOMER_ID: i64 = 1;
const SAMPLE_ACCOUNT_ID: i64 = 1001;

/// (date, merchant, amount, type, category)
const SAMPLE_TRANSACTIONS: &[(&str, &str, &str, &str, Option<&str>)] = &[
    ("2025-01-03", "FairPrice Finest", "86.45", "Purchase", Some("Groceries")),
    ("2025-01-05", "Grab", "18.20", "Purchase", Some("Transport")),
    ("2025-01-09", "Singtel", "45.00", "Purchase", Some("Utilities")),
    ("2025-01-12", "Uniqlo", "129.90", "Purchase", Some("Shopping")),
    ("2025-01-12", "Uniqlo", "39.90", "Refund", Some("Shopping")),
    ("2025-01-15", "Payment - Thank You", "500.00", "Payment", None),
    ("2025-01-18", "Din Tai Fung", "64.30", "Purchase", Some("Dining")),
    ("2025-01-21", "Annual Card Fee", "192.60", "Fee", None),
    ("2025-01-22", "Annual Card Fee Waiver", "192.60", "Credit", None),
    ("2025-01-25", "Shopee", "23.75", "Purchase", Some("Shopping")),
    ("2025-01-28", "Late Payment Charge", "100.00", "Fee", None),
    ("2025-01-30", "Golden Village", "27.00", "Purchase", Some("Entertainment")),
];

pub(super) async fn insert(db: &Db) -> Result<i64> {
    let customer = Customer {
        customer_id: SAMPLE_CUSTOMER_ID,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: "+65 9123 4567".to_string(),
        address: "12 Marina Boulevard, Singapore 018982".to_string(),
    };
    let account = Account {
        account_id: SAMPLE_ACCOUNT_ID,
        account_number: "DBS-2025-0001".to_string(),
        account_type: "Platinum".to_string(),
        card_number: "4532015112830366".to_string(),
        credit_limit: Decimal::new(1_000_000, 2),
    };
    let transactions = SAMPLE_TRANSACTIONS
        .iter()
        .map(|(date, merchant, amount, transaction_type, category)| {
            let date = NaiveDate::parse_from_str(date, super::DATE_FORMAT)
                .with_context(|| format!("Bad sample date '{date}'"))?;
            Ok(TransactionRecord::new(
                date,
                *merchant,
                *amount,
                *transaction_type,
                category.map(str::to_string),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    db.insert_customer(&customer).await?;
    db.insert_account(customer.customer_id, &account).await?;
    let count = db.insert_transactions(account.account_id, &transactions).await?;
    info!(
        "Added sample customer {} ({}) with {count} transactions",
        customer.customer_id,
        customer.full_name()
    );
    Ok(customer.customer_id)
}

#[cfg(test)]
mod tests {
    use crate::db::{Db, StatementData, SAMPLE_CUSTOMER_ID};
    use crate::totals::aggregate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sample_data_totals() {
        let dir = TempDir::new().unwrap();
        let db = Db::init(dir.path().join("s.sqlite")).await.unwrap();
        assert_eq!(db.insert_sample_data().await.unwrap(), SAMPLE_CUSTOMER_ID);

        let StatementData::Found { transactions, .. } =
            db.statement_data(SAMPLE_CUSTOMER_ID, None).await.unwrap()
        else {
            panic!("sample customer not found");
        };
        assert_eq!(transactions.len(), 12);
        let totals = aggregate(&transactions).unwrap();
        assert_eq!(totals.purchases(), Decimal::from_str("394.60").unwrap());
        assert_eq!(totals.payments(), Decimal::from_str("500.00").unwrap());
        assert_eq!(totals.fees(), Decimal::from_str("292.60").unwrap());
        assert_eq!(totals.credits(), Decimal::from_str("232.50").unwrap());
        assert_eq!(totals.net_total(), Decimal::from_str("-45.30").unwrap());
    }
}
