pub mod user;
pub mod transaction;
pub mod ledger;
pub mod password;
pub mod admin;
pub mod error;

pub use user::{UserMap, UserName, UserRecord, UserSummary};
pub use transaction::{Amount, Transaction, TransactionKind};
pub use ledger::{Ledger, Dashboard};
pub use admin::AdminGate;
pub use error::{BankError, BankResult};
