//! Password obfuscation for stored user records.
//!
//! This is a reversible base64 encoding, NOT a hash. It only keeps
//! passwords from being readable at a glance in the profile file and
//! offers no protection whatsoever. Demo-only behaviour.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Deserialize};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPassword(String);

impl EncodedPassword {
    pub fn encode(plain: &str) -> EncodedPassword {
        EncodedPassword(STANDARD.encode(plain.as_bytes()))
    }

    pub fn matches(&self, plain: &str) -> bool {
        *self == EncodedPassword::encode(plain)
    }

    /// Recovers the original password, if the stored value decodes.
    pub fn decode(&self) -> Option<String> {
        let bytes = STANDARD.decode(&self.0).ok()?;
        String::from_utf8(bytes).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncodedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedPassword(..)")
    }
}
