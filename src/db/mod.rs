//! This module is responsible for reading, writing and managing the SQLite database

mod migrations;
mod sample;

use crate::model::{Account, Customer, TransactionRecord};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub(crate) use sample::SAMPLE_CUSTOMER_ID;

const DATE_FORMAT: &str = "%Y-%m-%d";

type CustomerRow = (i64, String, String, String, String, String);
type AccountRow = (i64, String, String, String, String);
type TransactionRow = (String, String, String, String, String);

/// Everything needed to build a statement for one customer, or the reason there is nothing to
/// build.
#[derive(Debug, Clone)]
pub(crate) enum StatementData {
    NoCustomer,
    NoAccount(Customer),
    Found {
        customer: Customer,
        account: Account,
        /// Most recent first.
        transactions: Vec<TransactionRecord>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The SQLite database is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        let version = migrations::current_version(&pool).await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A file already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    pub(crate) async fn customer(&self, customer_id: i64) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT customer_id, first_name, last_name, email, \
             COALESCE(phone, 'N/A'), COALESCE(address, 'N/A') \
             FROM customers WHERE customer_id = ?",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to query customer {customer_id}"))?;
        Ok(row.map(customer_from_row))
    }

    /// The customer's first account, by account id.
    pub(crate) async fn account_for(&self, customer_id: i64) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT account_id, account_number, account_type, card_number, credit_limit \
             FROM accounts WHERE customer_id = ? ORDER BY account_id LIMIT 1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to query the account of customer {customer_id}"))?;
        row.map(account_from_row).transpose()
    }

    pub(crate) async fn account(&self, account_id: i64) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT account_id, account_number, account_type, card_number, credit_limit \
             FROM accounts WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to query account {account_id}"))?;
        row.map(account_from_row).transpose()
    }

    /// The account's transactions, most recent first. `limit` keeps only the first `n`.
    pub(crate) async fn transactions(
        &self,
        account_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<TransactionRecord>> {
        // A negative LIMIT means no limit in SQLite.
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT transaction_date, merchant_name, transaction_amount, transaction_type, \
             COALESCE(category, 'General') \
             FROM transactions WHERE account_id = ? \
             ORDER BY transaction_date DESC, transaction_id DESC LIMIT ?",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query transactions of account {account_id}"))?;
        rows.into_iter().map(transaction_from_row).collect()
    }

    pub(crate) async fn statement_data(
        &self,
        customer_id: i64,
        limit: Option<u32>,
    ) -> Result<StatementData> {
        let Some(customer) = self.customer(customer_id).await? else {
            return Ok(StatementData::NoCustomer);
        };
        let Some(account) = self.account_for(customer_id).await? else {
            return Ok(StatementData::NoAccount(customer));
        };
        let transactions = self.transactions(account.account_id, limit).await?;
        debug!(
            "Loaded {} transaction(s) for customer {customer_id}",
            transactions.len()
        );
        Ok(StatementData::Found {
            customer,
            account,
            transactions,
        })
    }

    pub(crate) async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (customer_id, first_name, last_name, email, phone, address) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(customer.customer_id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert customer {}", customer.customer_id))?;
        Ok(())
    }

    pub(crate) async fn insert_account(&self, customer_id: i64, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts \
             (account_id, customer_id, account_number, account_type, card_number, credit_limit) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(account.account_id)
        .bind(customer_id)
        .bind(&account.account_number)
        .bind(&account.account_type)
        .bind(&account.card_number)
        .bind(account.credit_limit.to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert account {}", account.account_id))?;
        Ok(())
    }

    /// Inserts all of `transactions` in one database transaction. Either every row is stored or
    /// none are.
    pub(crate) async fn insert_transactions(
        &self,
        account_id: i64,
        transactions: &[TransactionRecord],
    ) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        let mut inserted = 0;
        for (ix, record) in transactions.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO transactions (account_id, transaction_date, merchant_name, \
                 transaction_amount, transaction_type, category) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(account_id)
            .bind(record.transaction_date().format(DATE_FORMAT).to_string())
            .bind(record.merchant_name())
            .bind(record.raw_amount())
            .bind(record.transaction_type())
            .bind(record.category())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert transaction {}", ix + 1))?;
            inserted += result.rows_affected();
        }
        tx.commit().await.context("Failed to commit transactions")?;
        Ok(inserted)
    }

    /// Adds a demonstration customer with an account and a few months of activity.
    pub(crate) async fn insert_sample_data(&self) -> Result<i64> {
        sample::insert(self).await
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

fn customer_from_row(row: CustomerRow) -> Customer {
    let (customer_id, first_name, last_name, email, phone, address) = row;
    Customer {
        customer_id,
        first_name,
        last_name,
        email,
        phone,
        address,
    }
}

fn account_from_row(row: AccountRow) -> Result<Account> {
    let (account_id, account_number, account_type, card_number, credit_limit) = row;
    let credit_limit = Decimal::from_str(credit_limit.trim()).with_context(|| {
        format!("Account {account_id} has a malformed credit limit '{credit_limit}'")
    })?;
    Ok(Account {
        account_id,
        account_number,
        account_type,
        card_number,
        credit_limit,
    })
}

fn transaction_from_row(row: TransactionRow) -> Result<TransactionRecord> {
    let (date, merchant_name, amount, transaction_type, category) = row;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .with_context(|| format!("Malformed transaction date '{date}'"))?;
    Ok(TransactionRecord::new(
        date,
        merchant_name,
        amount,
        transaction_type,
        Some(category),
    ))
}
