use thiserror::Error;

use crate::backend::BackendError;
use crate::core::{Amount, UserName};

#[derive(Debug, Error)]
pub enum BankError {
    /// Occurs when a registration form is incomplete
    /// or its two password fields disagree.
    #[error("{0}")]
    Validation(&'static str),
    /// Occurs when registering a username that is already taken.
    #[error("username {0} is already taken")]
    DuplicateUser(UserName),
    /// Occurs when a username is unknown or its password does not match.
    #[error("invalid username or password")]
    Auth,
    /// Occurs when a transfer names a recipient with no account.
    #[error("no such recipient: {0}")]
    RecipientNotFound(UserName),
    #[error("cannot transfer money to yourself")]
    SelfTransfer,
    /// Occurs when a transfer amount is not a positive number.
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        balance: Amount,
        requested: Amount
    },
    /// Occurs when an operation needs a session and there is none.
    #[error("not logged in")]
    NotAuthenticated,
    #[error("admin area is locked")]
    AdminLocked,
    #[error("wrong admin password")]
    AdminAuth,
    #[error(transparent)]
    Backend(#[from] BackendError)
}

pub type BankResult<T> = Result<T, BankError>;
