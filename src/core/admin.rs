use log::{info, warn};
use sha2::{Digest, Sha256};

use crate::core::error::{BankError, BankResult};

pub type PasswordDigest = [u8; 32];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdminState {
    Locked,
    Unlocked
}

/// Gate in front of the admin listing. Independent of the user session.
#[derive(Debug, Clone)]
pub struct AdminGate {
    digest: Option<PasswordDigest>,
    state: AdminState
}

pub fn digest_password(password: &str) -> PasswordDigest {
    Sha256::digest(password.as_bytes()).into()
}

impl AdminGate {
    /// A gate that unlocks for the password hashing to `digest`.
    /// Without a digest the gate stays locked forever.
    pub fn new(digest: Option<PasswordDigest>) -> AdminGate {
        AdminGate { digest, state: AdminState::Locked }
    }

    pub fn from_hex_digest(digest_hex: &str) -> Result<AdminGate, hex::FromHexError> {
        let mut digest = [0u8; 32];
        hex::decode_to_slice(digest_hex.trim(), &mut digest)?;
        Ok(AdminGate::new(Some(digest)))
    }

    pub fn state(&self) -> AdminState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == AdminState::Unlocked
    }

    pub fn unlock(&mut self, password: &str) -> BankResult<()> {
        match self.digest {
            Some(expected) if expected == digest_password(password) => {
                self.state = AdminState::Unlocked;
                info!("admin area unlocked");
                Ok(())
            },
            Some(_) => {
                warn!("rejected admin password");
                Err(BankError::AdminAuth)
            },
            None => {
                warn!("admin unlock attempted with no credential configured");
                Err(BankError::AdminAuth)
            }
        }
    }

    pub fn logout(&mut self) {
        self.state = AdminState::Locked;
    }

    pub(crate) fn require_unlocked(&self) -> BankResult<()> {
        match self.state {
            AdminState::Unlocked => Ok(()),
            AdminState::Locked => Err(BankError::AdminLocked)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn gate() -> AdminGate {
        AdminGate::new(Some(digest_password("admin123")))
    }

    #[rstest]
    fn starts_locked(gate: AdminGate) {
        assert_eq!(gate.state(), AdminState::Locked);
        assert!(matches!(gate.require_unlocked(), Err(BankError::AdminLocked)));
    }

    #[rstest]
    fn wrong_password_stays_locked(mut gate: AdminGate) {
        assert!(matches!(gate.unlock("admin"), Err(BankError::AdminAuth)));
        assert!(!gate.is_unlocked());
    }

    #[rstest]
    fn unlock_then_logout(mut gate: AdminGate) {
        gate.unlock("admin123").unwrap();
        assert!(gate.is_unlocked());
        gate.logout();
        assert_eq!(gate.state(), AdminState::Locked);
    }

    #[rstest]
    fn hex_digest_config() {
        // sha256("admin123")
        let mut gate = AdminGate::from_hex_digest(
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9").unwrap();
        gate.unlock("admin123").unwrap();
        assert!(gate.is_unlocked());
    }

    #[rstest]
    fn bad_hex_digest() {
        assert!(AdminGate::from_hex_digest("zz").is_err());
    }

    #[rstest]
    fn no_credential_never_unlocks() {
        let mut gate = AdminGate::new(None);
        assert!(gate.unlock("").is_err());
        assert!(!gate.is_unlocked());
    }
}
