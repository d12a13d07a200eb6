use std::ops::RangeInclusive;

use log::{debug, info, warn};
use rand::Rng;

use crate::backend::KeyValueStore;
use crate::core::admin::AdminGate;
use crate::core::error::{BankError, BankResult};
use crate::core::password::EncodedPassword;
use crate::core::transaction::{Amount, Transaction, DATE_FORMAT};
use crate::core::user::{UserMap, UserName, UserRecord, UserSummary};

pub const USERS_KEY: &str = "bank_users";
pub const SESSION_KEY: &str = "bank_session";

/// What a logged in user sees: their balance and history.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub username: UserName,
    pub balance: Amount,
    pub transactions: Vec<Transaction>
}

/// Accounts and the session pointer of one profile, kept in `S`.
///
/// Every handler reads what it needs from the store and writes the whole
/// user map back in a single `set`, so a handler either fails before
/// writing or leaves the store fully updated.
pub struct Ledger<S: KeyValueStore> {
    store: S,
    opening_balance: RangeInclusive<u32>
}

pub fn parse_amount(input: &str) -> BankResult<Amount> {
    input.trim().parse::<Amount>().map_err(|_| BankError::InvalidAmount)
}

fn now() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

impl<S: KeyValueStore> Ledger<S> {
    pub const DEFAULT_OPENING_BALANCE: RangeInclusive<u32> = 1000..=9999;

    pub fn new(store: S) -> Ledger<S> {
        Ledger { store, opening_balance: Self::DEFAULT_OPENING_BALANCE }
    }

    pub fn with_opening_balance(store: S, range: RangeInclusive<u32>) -> BankResult<Ledger<S>> {
        if range.is_empty() {
            return Err(BankError::Validation("opening balance range is empty"));
        }
        Ok(Ledger { store, opening_balance: range })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All accounts. Unparseable stored data reads as no accounts.
    pub fn users(&self) -> BankResult<UserMap> {
        let raw = match self.store.get(USERS_KEY)? {
            Some(raw) => raw,
            None => return Ok(UserMap::new())
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!("ignoring corrupt {}: {}", USERS_KEY, err);
                Ok(UserMap::new())
            }
        }
    }

    fn save_users(&mut self, users: &UserMap) -> BankResult<()> {
        let raw = serde_json::to_string(users).map_err(crate::backend::BackendError::from)?;
        self.store.set(USERS_KEY, &raw)?;
        debug!("saved {} accounts", users.len());
        Ok(())
    }

    pub fn current_user(&self) -> BankResult<Option<UserName>> {
        let raw = match self.store.get(SESSION_KEY)? {
            Some(raw) => raw,
            None => return Ok(None)
        };
        match serde_json::from_str::<Option<UserName>>(&raw) {
            Ok(session) => Ok(session.filter(|name| !name.is_empty())),
            Err(err) => {
                warn!("ignoring corrupt {}: {}", SESSION_KEY, err);
                Ok(None)
            }
        }
    }

    fn save_session(&mut self, username: Option<&str>) -> BankResult<()> {
        let raw = serde_json::to_string(&username).map_err(crate::backend::BackendError::from)?;
        self.store.set(SESSION_KEY, &raw)?;
        Ok(())
    }

    fn restore_session(&mut self, previous: Option<String>) {
        let restored = match &previous {
            Some(raw) => self.store.set(SESSION_KEY, raw),
            None => self.store.remove(SESSION_KEY)
        };
        if let Err(err) = restored {
            warn!("could not restore {}: {}", SESSION_KEY, err);
        }
    }

    /// Opens an account with a random starting balance and logs into it.
    /// Returns the starting balance.
    pub fn register(&mut self, username: &str, password: &str, confirm_password: &str) -> BankResult<Amount> {
        self.register_with_rng(&mut rand::thread_rng(), username, password, confirm_password)
    }

    pub fn register_with_rng<R: Rng>(&mut self, rng: &mut R,
        username: &str, password: &str, confirm_password: &str) -> BankResult<Amount>
    {
        if username.trim().is_empty() || password.is_empty() {
            return Err(BankError::Validation("username and password are required"));
        }
        if password != confirm_password {
            return Err(BankError::Validation("passwords do not match"));
        }

        let mut users = self.users()?;
        if users.contains_key(username) {
            return Err(BankError::DuplicateUser(username.to_owned()));
        }

        let deposit = rng.gen_range(self.opening_balance.clone()) as Amount;
        let record = UserRecord::opened_with(EncodedPassword::encode(password), deposit, &now());
        users.insert(username.to_owned(), record);

        // session goes first so a failed account write can be undone
        let previous_session = self.store.get(SESSION_KEY)?;
        self.save_session(Some(username))?;
        if let Err(err) = self.save_users(&users) {
            self.restore_session(previous_session);
            return Err(err);
        }

        info!("registered {} with opening balance {}", username, deposit);
        Ok(deposit)
    }

    pub fn login(&mut self, username: &str, password: &str) -> BankResult<()> {
        let users = self.users()?;
        match users.get(username) {
            Some(record) if record.password.matches(password) => {
                self.save_session(Some(username))?;
                info!("{} logged in", username);
                Ok(())
            },
            _ => Err(BankError::Auth)
        }
    }

    pub fn logout(&mut self) -> BankResult<()> {
        if let Some(username) = self.current_user()? {
            info!("{} logged out", username);
        }
        self.save_session(None)
    }

    /// The session user's account, or `NotAuthenticated` to send them
    /// back to the login screen.
    pub fn dashboard(&self) -> BankResult<Dashboard> {
        let username = self.current_user()?.ok_or(BankError::NotAuthenticated)?;
        let mut users = self.users()?;
        let record = users.remove(&username).ok_or(BankError::NotAuthenticated)?;
        Ok(Dashboard { username, balance: record.balance, transactions: record.transactions })
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> BankResult<()> {
        let mut users = self.users()?;

        if !users.contains_key(to) {
            return Err(BankError::RecipientNotFound(to.to_owned()));
        }
        if to == from {
            return Err(BankError::SelfTransfer);
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BankError::InvalidAmount);
        }

        let date = now();
        let sender = users.get_mut(from).ok_or(BankError::Auth)?;
        if sender.balance < amount {
            return Err(BankError::InsufficientFunds { balance: sender.balance, requested: amount });
        }
        sender.balance -= amount;
        sender.transactions.push(Transaction::debit(amount, &date, &format!("Transfer to {}", to)));

        let recipient = users.get_mut(to).ok_or_else(|| BankError::RecipientNotFound(to.to_owned()))?;
        recipient.balance += amount;
        recipient.transactions.push(Transaction::credit(amount, &date, &format!("Transfer from {}", from)));

        self.save_users(&users)?;
        info!("transferred {} from {} to {}", amount, from, to);
        Ok(())
    }

    pub fn transfer_from_session(&mut self, to: &str, amount: Amount) -> BankResult<()> {
        let from = self.current_user()?.ok_or(BankError::NotAuthenticated)?;
        self.transfer(&from, to, amount)
    }

    pub fn list_all_users(&self, gate: &AdminGate) -> BankResult<Vec<UserSummary>> {
        gate.require_unlocked()?;
        Ok(self.users()?
            .into_iter()
            .map(|(username, record)| UserSummary { username, balance: record.balance })
            .collect())
    }
}
