use serde::{Serialize, Deserialize};
use colored::Colorize;

pub type Amount = f64;

/// Format of the `date` field of every transaction.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = match self {
            Self::Credit => "credit",
            Self::Debit => "debit"
        };
        write!(f, "{}", disp)
    }
}

/// One entry of an account history. Entries are only ever appended.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub date: String,
    pub desc: String
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let signed = match self.kind {
            TransactionKind::Credit => format!("+{}", self.amount).green(),
            TransactionKind::Debit => format!("-{}", self.amount).bright_red()
        };
        write!(f, "{} {} {}", self.date.bold(), signed, self.desc)
    }
}

impl Transaction {
    pub fn credit(amount: Amount, date: &str, desc: &str) -> Transaction {
        Transaction { kind: TransactionKind::Credit, amount, date: date.to_owned(), desc: desc.to_owned() }
    }

    pub fn debit(amount: Amount, date: &str, desc: &str) -> Transaction {
        Transaction { kind: TransactionKind::Debit, amount, date: date.to_owned(), desc: desc.to_owned() }
    }

    /// Effect of this entry on the owning account's balance.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount
        }
    }
}


#[cfg(test)]
mod tests {
    use crate::core::transaction::{Transaction, TransactionKind};
    use colored;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn transaction() -> Transaction {
        Transaction::debit(250.0, "2024-03-01 12:00:00", "Transfer to Frodo")
    }

    #[fixture]
    fn transaction_json() -> serde_json::Value {
        json!({
            "type": "debit",
            "amount": 250.0,
            "date": "2024-03-01 12:00:00",
            "desc": "Transfer to Frodo"
        })
    }

    #[rstest]
    fn can_print(transaction: Transaction) {
        colored::control::set_override(false);
        assert_eq!(transaction.to_string(), "2024-03-01 12:00:00 -250 Transfer to Frodo");
    }

    #[rstest]
    fn serialize(transaction: Transaction, transaction_json: serde_json::Value) {
        assert_eq!(serde_json::to_value(&transaction).unwrap(), transaction_json);
    }

    #[rstest]
    fn deserialize_credit() {
        let parsed: Transaction = serde_json::from_value(json!({
            "type": "credit", "amount": 1200, "date": "d", "desc": "Initial deposit"
        })).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Credit);
        assert_eq!(parsed.signed_amount(), 1200.0);
    }

    #[rstest]
    fn signed_amount(transaction: Transaction) {
        assert_eq!(transaction.signed_amount(), -250.0);
    }
}
