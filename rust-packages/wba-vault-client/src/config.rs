//! Client configuration.
//!
//! Program ids and network settings are passed explicitly to every component
//! through [`VaultConfig`]; nothing reads process-wide state after
//! construction.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::constants::{
    DEFAULT_CONFIRM_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEVNET_RPC_URL, TOKEN_PROGRAM_ID,
    VAULT_PROGRAM_ID,
};
use crate::errors::{Result, VaultError};

/// Confirmation depth to wait for after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn to_config(self) -> CommitmentConfig {
        match self {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

impl FromStr for Commitment {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(VaultError::Config(format!("unknown commitment '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub rpc_url: String,
    #[serde(with = "pubkey_string")]
    pub vault_program_id: Pubkey,
    #[serde(with = "pubkey_string")]
    pub token_program_id: Pubkey,
    pub commitment: Commitment,
    pub confirm_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

impl VaultConfig {
    /// Devnet endpoint, the deployed vault program, and `confirmed` commitment.
    pub fn devnet() -> Self {
        Self {
            rpc_url: DEVNET_RPC_URL.to_string(),
            vault_program_id: VAULT_PROGRAM_ID,
            token_program_id: TOKEN_PROGRAM_ID,
            commitment: Commitment::Confirmed,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Devnet defaults overridden by `VAULT_*` environment variables.
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| VaultError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::devnet();
        if let Some(url) = lookup("VAULT_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(id) = lookup("VAULT_PROGRAM_ID") {
            config.vault_program_id = parse_pubkey("VAULT_PROGRAM_ID", &id)?;
        }
        if let Some(id) = lookup("VAULT_TOKEN_PROGRAM_ID") {
            config.token_program_id = parse_pubkey("VAULT_TOKEN_PROGRAM_ID", &id)?;
        }
        if let Some(level) = lookup("VAULT_COMMITMENT") {
            config.commitment = level.parse()?;
        }
        if let Some(secs) = lookup("VAULT_CONFIRM_TIMEOUT_SECS") {
            config.confirm_timeout_secs = parse_u64("VAULT_CONFIRM_TIMEOUT_SECS", &secs)?;
        }
        if let Some(ms) = lookup("VAULT_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse_u64("VAULT_POLL_INTERVAL_MS", &ms)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(VaultError::Config("rpc_url is empty".into()));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(VaultError::Config("confirm_timeout_secs must be > 0".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(VaultError::Config("poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub(crate) fn parse_pubkey(name: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|e| VaultError::Config(format!("{name}: {e}")))
}

fn parse_u64(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| VaultError::Config(format!("{name}: {e}")))
}

/// Serialize pubkeys as base58 strings rather than byte arrays.
mod pubkey_string {
    use std::str::FromStr;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(D::Error::custom)
    }
}
