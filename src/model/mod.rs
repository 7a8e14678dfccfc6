//! Types that represent the statement data model, such as `Customer`, `Account` and
//! `TransactionRecord`, along with the closed sets of codes accepted from users.
mod customer;
mod language;
mod region;
mod transaction;

pub use customer::{Account, Customer};
pub use language::Language;
pub use region::{Country, Currency};
pub use transaction::{Bucket, TransactionRecord, DEFAULT_CATEGORY};
