//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Account, Customer};
use crate::Config;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A customer with no account.
pub(crate) const NO_ACCOUNT_CUSTOMER_ID: i64 = 2;
/// A customer whose account has no transactions.
pub(crate) const NO_TRANSACTIONS_CUSTOMER_ID: i64 = 3;
const NO_TRANSACTIONS_ACCOUNT_ID: i64 = 3001;

/// Test environment that sets up a statement home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment holding the sample customer plus one customer without an
    /// account and one whose account is empty.
    pub async fn new() -> Self {
        let env = Self::empty().await;
        let db = env.config.db();
        db.insert_sample_data().await.unwrap();

        db.insert_customer(&customer(NO_ACCOUNT_CUSTOMER_ID, "Nora", "Noaccount"))
            .await
            .unwrap();
        db.insert_customer(&customer(NO_TRANSACTIONS_CUSTOMER_ID, "Quinn", "Quiet"))
            .await
            .unwrap();
        let account = Account {
            account_id: NO_TRANSACTIONS_ACCOUNT_ID,
            account_number: "DBS-2025-0003".to_string(),
            account_type: "Classic".to_string(),
            card_number: "5500005555555559".to_string(),
            credit_limit: Decimal::new(500_000, 2),
        };
        db.insert_account(NO_TRANSACTIONS_CUSTOMER_ID, &account)
            .await
            .unwrap();
        env
    }

    /// Creates a test environment with Config and an initialized, empty database.
    pub async fn empty() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("statements");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Stores a purchase with `amount` written as-is, bypassing validation, in the given
    /// customer's account. Only customers created by `new` are supported.
    pub async fn insert_raw_transaction(&self, customer_id: i64, amount: &str) {
        let account_id = self
            .config
            .db()
            .account_for(customer_id)
            .await
            .unwrap()
            .unwrap()
            .account_id;
        sqlx::query(
            "INSERT INTO transactions (account_id, transaction_date, merchant_name, \
             transaction_amount, transaction_type) VALUES (?, '2025-01-10', 'Raw', ?, 'Purchase')",
        )
        .bind(account_id)
        .bind(amount)
        .execute(self.config.db().pool())
        .await
        .unwrap();
    }
}

fn customer(customer_id: i64, first_name: &str, last_name: &str) -> Customer {
    Customer {
        customer_id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: "N/A".to_string(),
        address: "N/A".to_string(),
    }
}
