//! Instruction builders for the WBA vault program.
//!
//! Builders are pure: they validate their arguments and lay out account metas
//! in the order the program's Anchor accounts structs declare them. Nothing
//! here touches the network.

use std::fmt;

use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::config::VaultConfig;
use crate::constants::ASSOCIATED_TOKEN_PROGRAM_ID;
use crate::errors::{Result, VaultError};
use crate::pda::VaultAddresses;
use crate::token_account::TokenAccount;

/// Compute Anchor instruction discriminator: sha256("global:{name}")[..8]
pub fn compute_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let hash = Sha256::digest(preimage.as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultInstructionKind {
    Initialize,
    Deposit,
    Withdraw,
    DepositSpl,
    WithdrawSpl,
    CloseAccount,
}

impl VaultInstructionKind {
    /// Method name as declared in the program's `#[program]` module.
    pub fn method_name(&self) -> &'static str {
        match self {
            VaultInstructionKind::Initialize => "initialize",
            VaultInstructionKind::Deposit => "deposit",
            VaultInstructionKind::Withdraw => "withdraw",
            VaultInstructionKind::DepositSpl => "deposit_spl",
            VaultInstructionKind::WithdrawSpl => "withdraw_spl",
            VaultInstructionKind::CloseAccount => "close_account",
        }
    }

    pub fn discriminator(&self) -> [u8; 8] {
        compute_discriminator(self.method_name())
    }
}

impl fmt::Display for VaultInstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Amounts are base units and must be non-zero.
pub(crate) fn check_amount(kind: VaultInstructionKind, amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(VaultError::InvalidAmount { kind });
    }
    Ok(())
}

fn amount_data(kind: VaultInstructionKind, amount: u64) -> Result<Vec<u8>> {
    check_amount(kind, amount)?;
    let mut data = kind.discriminator().to_vec();
    data.extend_from_slice(&amount.to_le_bytes());
    Ok(data)
}

/// Builds vault instructions against a fixed set of program ids.
#[derive(Debug, Clone, Copy)]
pub struct VaultInstructions {
    pub program_id: Pubkey,
    pub token_program_id: Pubkey,
    pub associated_token_program_id: Pubkey,
}

impl VaultInstructions {
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            program_id: config.vault_program_id,
            token_program_id: config.token_program_id,
            associated_token_program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        }
    }

    /// Both `owner` and `vault_state` sign: the program creates the vault
    /// state account at a fresh keypair address.
    pub fn initialize(&self, owner: &Pubkey, addresses: &VaultAddresses) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(addresses.vault_state, true),
                AccountMeta::new_readonly(addresses.vault_auth, false),
                AccountMeta::new(addresses.vault, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: VaultInstructionKind::Initialize.discriminator().to_vec(),
        }
    }

    /// Move `amount` lamports from `owner` into the native vault.
    pub fn deposit(&self, owner: &Pubkey, addresses: &VaultAddresses, amount: u64) -> Result<Instruction> {
        self.native_transfer(VaultInstructionKind::Deposit, owner, addresses, amount)
    }

    pub fn withdraw(&self, owner: &Pubkey, addresses: &VaultAddresses, amount: u64) -> Result<Instruction> {
        self.native_transfer(VaultInstructionKind::Withdraw, owner, addresses, amount)
    }

    fn native_transfer(
        &self,
        kind: VaultInstructionKind,
        owner: &Pubkey,
        addresses: &VaultAddresses,
        amount: u64,
    ) -> Result<Instruction> {
        let data = amount_data(kind, amount)?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new_readonly(addresses.vault_state, false),
                AccountMeta::new_readonly(addresses.vault_auth, false),
                AccountMeta::new(addresses.vault, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data,
        })
    }

    /// Move `amount` base units of `mint` from the owner's token account into
    /// the vault authority's token account.
    /// Both token accounts must already be bound to `mint`, and the vault's
    /// to the vault authority.
    pub fn deposit_spl(
        &self,
        owner: &Pubkey,
        owner_ata: &TokenAccount,
        addresses: &VaultAddresses,
        vault_ata: &TokenAccount,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<Instruction> {
        self.token_transfer(VaultInstructionKind::DepositSpl, owner, owner_ata, addresses, vault_ata, mint, amount)
    }

    pub fn withdraw_spl(
        &self,
        owner: &Pubkey,
        owner_ata: &TokenAccount,
        addresses: &VaultAddresses,
        vault_ata: &TokenAccount,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<Instruction> {
        self.token_transfer(VaultInstructionKind::WithdrawSpl, owner, owner_ata, addresses, vault_ata, mint, amount)
    }

    #[allow(clippy::too_many_arguments)]
    fn token_transfer(
        &self,
        kind: VaultInstructionKind,
        owner: &Pubkey,
        owner_ata: &TokenAccount,
        addresses: &VaultAddresses,
        vault_ata: &TokenAccount,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<Instruction> {
        let data = amount_data(kind, amount)?;
        owner_ata.ensure_binding(owner, mint)?;
        vault_ata.ensure_binding(&addresses.vault_auth, mint)?;

        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(owner_ata.address, false),
                AccountMeta::new_readonly(addresses.vault_state, false),
                AccountMeta::new_readonly(addresses.vault_auth, false),
                AccountMeta::new(vault_ata.address, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new_readonly(self.token_program_id, false),
                AccountMeta::new_readonly(self.associated_token_program_id, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data,
        })
    }

    /// Close the vault state and sweep the native vault back to `owner`.
    pub fn close_account(&self, owner: &Pubkey, addresses: &VaultAddresses) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(*owner, true),
                AccountMeta::new(addresses.vault_state, false),
                AccountMeta::new_readonly(addresses.vault_auth, false),
                AccountMeta::new(addresses.vault, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: VaultInstructionKind::CloseAccount.discriminator().to_vec(),
        }
    }
}
