//! Program-derived address search and the vault's address scheme.
//!
//! The canonical PDA is the one at the highest bump whose hash does not
//! decompress to an ed25519 point. Off-curve addresses have no private key, so
//! only the owning program can sign for them.

use solana_sdk::pubkey::{Pubkey, PubkeyError, MAX_SEEDS, MAX_SEED_LEN};

use crate::constants::{VAULT_AUTH_SEED, VAULT_SEED};
use crate::errors::{Result, VaultError};

fn seeds_too_long(seeds: &[&[u8]]) -> VaultError {
    VaultError::SeedsTooLong {
        seeds: seeds.len(),
        longest: seeds.iter().map(|s| s.len()).max().unwrap_or(0),
    }
}

fn check_seeds(seeds: &[&[u8]]) -> Result<()> {
    // The bump takes the last seed slot.
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(seeds_too_long(seeds));
    }
    Ok(())
}

/// `Ok(None)` when `bump` lands on the curve.
fn candidate(program_id: &Pubkey, seeds: &[&[u8]], bump: u8) -> Result<Option<Pubkey>> {
    let bump_seed = [bump];
    let mut with_bump = seeds.to_vec();
    with_bump.push(&bump_seed);
    match Pubkey::create_program_address(&with_bump, program_id) {
        Ok(address) => Ok(Some(address)),
        Err(PubkeyError::InvalidSeeds) => Ok(None),
        Err(PubkeyError::MaxSeedLengthExceeded) => Err(seeds_too_long(seeds)),
        Err(_) => Err(VaultError::DerivationExhausted {
            program_id: *program_id,
        }),
    }
}

/// Check a single `(seeds, bump)` candidate.
pub fn create_program_address(program_id: &Pubkey, seeds: &[&[u8]], bump: u8) -> Result<Pubkey> {
    check_seeds(seeds)?;
    candidate(program_id, seeds, bump)?.ok_or(VaultError::InvalidBump {
        program_id: *program_id,
        bump,
    })
}

/// Find the canonical `(address, bump)` for `seeds` under `program_id`.
///
/// Searches bumps 255 down to 0 and stops at the first off-curve candidate.
/// Same inputs always give the same pair.
pub fn derive_program_address(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8)> {
    check_seeds(seeds)?;
    for bump in (0..=u8::MAX).rev() {
        if let Some(address) = candidate(program_id, seeds, bump)? {
            return Ok((address, bump));
        }
    }
    Err(VaultError::DerivationExhausted {
        program_id: *program_id,
    })
}

/// The three accounts that make up one vault instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAddresses {
    pub vault_state: Pubkey,
    /// ["auth", vault_state]
    pub vault_auth: Pubkey,
    pub vault_auth_bump: u8,
    /// ["vault", vault_auth]
    pub vault: Pubkey,
    pub vault_bump: u8,
}

impl VaultAddresses {
    pub fn derive(program_id: &Pubkey, vault_state: &Pubkey) -> Result<Self> {
        let (vault_auth, vault_auth_bump) =
            derive_vault_auth_pda(program_id, vault_state)?;
        let (vault, vault_bump) = derive_vault_pda(program_id, &vault_auth)?;
        Ok(Self {
            vault_state: *vault_state,
            vault_auth,
            vault_auth_bump,
            vault,
            vault_bump,
        })
    }
}

/// Derive vault authority PDA
pub fn derive_vault_auth_pda(program_id: &Pubkey, vault_state: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_program_address(program_id, &[VAULT_AUTH_SEED, vault_state.as_ref()])
}

/// Derive native vault PDA
pub fn derive_vault_pda(program_id: &Pubkey, vault_auth: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_program_address(program_id, &[VAULT_SEED, vault_auth.as_ref()])
}
