//! Associated token account resolution.

use solana_sdk::{
    account::Account,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Signature, Signer},
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id, instruction::create_associated_token_account_idempotent,
};
use spl_token::state::Account as SplTokenAccount;
use tracing::{debug, info};

use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};
use crate::rpc::VaultRpc;
use crate::submit::TransactionSubmitter;

/// A token account bound to one (owner, mint) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub mint: Pubkey,
}

impl TokenAccount {
    pub fn ensure_binding(&self, owner: &Pubkey, mint: &Pubkey) -> Result<()> {
        if self.mint != *mint {
            return Err(VaultError::MintMismatch {
                account: self.address,
                expected: *mint,
                found: self.mint,
            });
        }
        if self.owner != *owner {
            return Err(VaultError::TokenOwnerMismatch {
                account: self.address,
                expected: *owner,
                found: self.owner,
            });
        }
        Ok(())
    }
}

/// Outcome of [`TokenAccountResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(TokenAccount),
    Created {
        account: TokenAccount,
        signature: Signature,
    },
}

impl Resolution {
    pub fn account(&self) -> &TokenAccount {
        match self {
            Resolution::Found(account) | Resolution::Created { account, .. } => account,
        }
    }

    pub fn address(&self) -> Pubkey {
        self.account().address
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Resolution::Created { .. })
    }
}

/// Canonical associated token account of `owner` for `mint`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program_id: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, token_program_id)
}

/// CreateIdempotent: succeeds without changes if the account already exists.
pub fn create_associated_token_account_ix(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, token_program_id)
}

/// Decode the (mint, owner) binding of an SPL token account.
pub fn unpack_token_binding(address: &Pubkey, account: &Account, token_program_id: &Pubkey) -> Result<TokenAccount> {
    if account.owner != *token_program_id {
        return Err(VaultError::InvalidAccountData {
            address: *address,
            reason: format!("owned by {}, not the token program", account.owner),
        });
    }
    let state = SplTokenAccount::unpack(&account.data).map_err(|e| VaultError::InvalidAccountData {
        address: *address,
        reason: e.to_string(),
    })?;
    Ok(TokenAccount {
        address: *address,
        owner: state.owner,
        mint: state.mint,
    })
}

/// Finds an owner's token account for a mint, creating it when absent.
///
/// Resolution can write to the network: an absent account is created in a
/// transaction paid by `payer`.
pub struct TokenAccountResolver<'a, R> {
    rpc: &'a R,
    submitter: TransactionSubmitter<'a, R>,
    payer: &'a dyn Signer,
    token_program_id: Pubkey,
}

impl<'a, R: VaultRpc> TokenAccountResolver<'a, R> {
    pub fn new(rpc: &'a R, config: &VaultConfig, payer: &'a dyn Signer) -> Self {
        Self {
            rpc,
            submitter: TransactionSubmitter::new(rpc, config),
            payer,
            token_program_id: config.token_program_id,
        }
    }

    pub fn associated_address(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        associated_token_address(owner, mint, &self.token_program_id)
    }

    /// `allow_owner_off_curve` must be set for program-derived owners.
    pub async fn resolve(&self, owner: &Pubkey, mint: &Pubkey, allow_owner_off_curve: bool) -> Result<Resolution> {
        if !allow_owner_off_curve && !owner.is_on_curve() {
            return Err(VaultError::InvalidOwnerForAccount { owner: *owner });
        }

        let address = self.associated_address(owner, mint);
        let expected = TokenAccount {
            address,
            owner: *owner,
            mint: *mint,
        };

        if let Some(account) = self.rpc.fetch_account(&address).await? {
            let found = unpack_token_binding(&address, &account, &self.token_program_id)?;
            if found != expected {
                return Err(VaultError::TokenAccountMismatch {
                    address,
                    owner: found.owner,
                    mint: found.mint,
                });
            }
            debug!(%address, %owner, %mint, "token account found");
            return Ok(Resolution::Found(expected));
        }

        let ix = create_associated_token_account_ix(&self.payer.pubkey(), owner, mint, &self.token_program_id);
        let signature = self
            .submitter
            .submit(&[ix], &self.payer.pubkey(), &[self.payer])
            .await
            .map_err(|err| match err {
                VaultError::SubmissionRejected { reason, .. } => VaultError::AccountCreationRejected {
                    address,
                    reason: reason.to_string(),
                },
                other => other,
            })?;

        info!(%address, %owner, %mint, %signature, "token account created");
        Ok(Resolution::Created {
            account: expected,
            signature,
        })
    }
}
