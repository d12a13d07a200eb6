use std::{fs, io, ops::RangeInclusive, path::{Path, PathBuf}};

use anyhow::{self, bail, Context};
use serde::{Serialize, Deserialize};

use crate::core::AdminGate;

pub const DEFAULT_CONFIG: &str = "resources/bank.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Profile file holding the key-value store
    pub profile: PathBuf
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { profile: PathBuf::from("profile.json") }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Hex SHA-256 digest of the admin password
    pub password_sha256: Option<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankSettings {
    pub opening_balance_min: u32,
    pub opening_balance_max: u32
}

impl Default for BankSettings {
    fn default() -> Self {
        BankSettings { opening_balance_min: 1000, opening_balance_max: 9999 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub bank: BankSettings
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(&filepath)
            .with_context(|| format!("failed to read config file {}", filepath.as_ref().display()))?;
        Self::parse(&file_content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "failed to parse config file")?;
        config.validate()?;
        return Ok(config);
    }

    /// Reads `filepath` if given. Otherwise reads the default location,
    /// falling back to built-in settings when that file does not exist.
    pub fn load(filepath: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = filepath {
            return Self::read(path);
        }
        match fs::metadata(DEFAULT_CONFIG) {
            Ok(_) => Self::read(DEFAULT_CONFIG),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no {}, using built-in configuration", DEFAULT_CONFIG);
                Ok(Self::default())
            },
            Err(err) => Err(err).with_context(|| format!("failed to inspect {}", DEFAULT_CONFIG))
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.bank.opening_balance_min > self.bank.opening_balance_max {
            bail!("opening_balance_min {} exceeds opening_balance_max {}",
                self.bank.opening_balance_min, self.bank.opening_balance_max);
        }
        if let Some(digest) = &self.admin.password_sha256 {
            AdminGate::from_hex_digest(digest)
                .with_context(|| "admin.password_sha256 is not a hex SHA-256 digest")?;
        }
        Ok(())
    }

    pub fn opening_balance(&self) -> RangeInclusive<u32> {
        self.bank.opening_balance_min..=self.bank.opening_balance_max
    }

    pub fn admin_gate(&self) -> anyhow::Result<AdminGate> {
        match &self.admin.password_sha256 {
            Some(digest) => AdminGate::from_hex_digest(digest)
                .with_context(|| "admin.password_sha256 is not a hex SHA-256 digest"),
            None => Ok(AdminGate::new(None))
        }
    }
}
