use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Deserialize};

use crate::core::password::EncodedPassword;
use crate::core::transaction::{Amount, Transaction};

pub type UserName = String;

/// All accounts of a profile, keyed by case-sensitive username.
pub type UserMap = BTreeMap<UserName, UserRecord>;

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: EncodedPassword,
    pub balance: Amount,
    pub transactions: Vec<Transaction>
}

impl UserRecord {
    /// A fresh account holding `deposit`, recorded as its first credit.
    pub fn opened_with(password: EncodedPassword, deposit: Amount, date: &str) -> UserRecord {
        UserRecord {
            password,
            balance: deposit,
            transactions: vec![Transaction::credit(deposit, date, "Initial deposit")]
        }
    }

    /// Balance implied by the transaction history alone.
    pub fn replayed_balance(&self) -> Amount {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserRecord {} ({} transactions)", self.balance, self.transactions.len())
    }
}

/// Row of the admin listing.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct UserSummary {
    pub username: UserName,
    pub balance: Amount
}

impl fmt::Display for UserSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.username, self.balance)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opened_account_replays_to_balance() {
        let record = UserRecord::opened_with(EncodedPassword::encode("pw"), 4321.0, "today");
        assert_eq!(record.transactions.len(), 1);
        assert_eq!(record.replayed_balance(), 4321.0);
    }

    #[test]
    fn record_json_shape() {
        let record = UserRecord::opened_with(EncodedPassword::encode("pw"), 1000.0, "today");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({
            "password": "cHc=",
            "balance": 1000.0,
            "transactions": [
                {"type": "credit", "amount": 1000.0, "date": "today", "desc": "Initial deposit"}
            ]
        }));
    }
}
