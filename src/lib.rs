mod core;
pub mod backend;
pub mod config;
pub mod stego;

pub use crate::core::{Ledger, Dashboard, AdminGate, BankError, BankResult};
pub use crate::core::{Amount, Transaction, TransactionKind, UserMap, UserName, UserRecord, UserSummary};
pub use crate::core::{admin, ledger, password, transaction, user};
