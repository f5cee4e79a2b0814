//! On-chain vault state record.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::errors::{Result, VaultError};

/// Compute Anchor account discriminator: sha256("account:{name}")[..8]
pub fn compute_account_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("account:{}", name);
    let hash = Sha256::digest(preimage.as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawVaultState {
    owner: [u8; 32],
    auth_bump: u8,
    vault_bump: u8,
    score: u8,
}

/// Decoded `VaultState` account. Written by `initialize`, never by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultStateAccount {
    pub owner: Pubkey,
    pub auth_bump: u8,
    pub vault_bump: u8,
    pub score: u8,
}

impl VaultStateAccount {
    pub const DISCRIMINATOR_NAME: &'static str = "VaultState";

    /// 8 discriminator + 32 owner + 3 bytes
    pub const LEN: usize = 8 + 32 + 1 + 1 + 1;

    pub fn try_from_account_data(address: &Pubkey, data: &[u8]) -> Result<Self> {
        let invalid = |reason: String| VaultError::InvalidAccountData {
            address: *address,
            reason,
        };

        if data.len() < Self::LEN {
            return Err(invalid(format!("{} bytes, expected at least {}", data.len(), Self::LEN)));
        }
        let (disc, mut body) = data.split_at(8);
        if disc != compute_account_discriminator(Self::DISCRIMINATOR_NAME).as_slice() {
            return Err(invalid("discriminator is not VaultState".into()));
        }

        let raw = RawVaultState::deserialize(&mut body).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            owner: Pubkey::new_from_array(raw.owner),
            auth_bump: raw.auth_bump,
            vault_bump: raw.vault_bump,
            score: raw.score,
        })
    }

    pub fn to_account_data(&self) -> std::io::Result<Vec<u8>> {
        let mut data = compute_account_discriminator(Self::DISCRIMINATOR_NAME).to_vec();
        RawVaultState {
            owner: self.owner.to_bytes(),
            auth_bump: self.auth_bump,
            vault_bump: self.vault_bump,
            score: self.score,
        }
        .serialize(&mut data)?;
        Ok(data)
    }
}
