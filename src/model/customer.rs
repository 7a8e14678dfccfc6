use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row from the `customers` table. `phone` and `address` hold `N/A` when the store has nothing.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A card account belonging to a customer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub account_number: String,
    pub account_type: String,
    pub card_number: String,
    pub credit_limit: Decimal,
}

impl Account {
    /// The short form printed on a statement, e.g. `XXXX-0366`.
    pub fn card_suffix(&self) -> String {
        format!("XXXX-{}", last_four(&self.card_number))
    }

    /// Returns a copy of the account that is safe to hand out over the API, with all but the last
    /// four digits of the card number replaced, e.g. `XXXX-XXXX-XXXX-0366`.
    pub fn masked(&self) -> Account {
        Account {
            card_number: format!("XXXX-XXXX-XXXX-{}", last_four(&self.card_number)),
            ..self.clone()
        }
    }
}

fn last_four(card_number: &str) -> String {
    let count = card_number.chars().count();
    card_number.chars().skip(count.saturating_sub(4)).collect()
}
