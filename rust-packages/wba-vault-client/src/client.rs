//! High-level vault flows: derive, resolve, build, submit.

use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::TransactionError,
};
use tracing::{info, instrument};

use crate::config::VaultConfig;
use crate::constants::SYSTEM_ERROR_ACCOUNT_ALREADY_IN_USE;
use crate::errors::{Result, VaultError};
use crate::instructions::{check_amount, VaultInstructionKind, VaultInstructions};
use crate::pda::VaultAddresses;
use crate::rpc::VaultRpc;
use crate::state::VaultStateAccount;
use crate::submit::TransactionSubmitter;
use crate::token_account::{Resolution, TokenAccountResolver};

/// Result of a confirmed vault transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultReceipt {
    pub signature: Signature,
    pub addresses: VaultAddresses,
}

/// Result of a confirmed token deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferReceipt {
    pub signature: Signature,
    pub addresses: VaultAddresses,
    pub owner_ata: Resolution,
    pub vault_ata: Resolution,
}

pub struct VaultClient<R> {
    rpc: R,
    config: VaultConfig,
    instructions: VaultInstructions,
}

impl<R: VaultRpc> VaultClient<R> {
    pub fn new(rpc: R, config: VaultConfig) -> Self {
        let instructions = VaultInstructions::new(&config);
        Self {
            rpc,
            config,
            instructions,
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn instructions(&self) -> &VaultInstructions {
        &self.instructions
    }

    pub fn addresses(&self, vault_state: &Pubkey) -> Result<VaultAddresses> {
        VaultAddresses::derive(&self.config.vault_program_id, vault_state)
    }

    pub fn submitter(&self) -> TransactionSubmitter<'_, R> {
        TransactionSubmitter::new(&self.rpc, &self.config)
    }

    pub fn token_resolver<'a>(&'a self, payer: &'a dyn Signer) -> TokenAccountResolver<'a, R> {
        TokenAccountResolver::new(&self.rpc, &self.config, payer)
    }

    /// `None` if no account lives at `vault_state`.
    pub async fn fetch_vault_state(&self, vault_state: &Pubkey) -> Result<Option<VaultStateAccount>> {
        let Some(account) = self.rpc.fetch_account(vault_state).await? else {
            return Ok(None);
        };
        if account.owner != self.config.vault_program_id {
            return Err(VaultError::InvalidAccountData {
                address: *vault_state,
                reason: format!("owned by {}, not the vault program", account.owner),
            });
        }
        VaultStateAccount::try_from_account_data(vault_state, &account.data).map(Some)
    }

    /// Create the vault at `vault_state`, which must be an unused address.
    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state.pubkey()))]
    pub async fn initialize(&self, owner: &dyn Signer, vault_state: &dyn Signer) -> Result<VaultReceipt> {
        let state_key = vault_state.pubkey();
        if self.rpc.fetch_account(&state_key).await?.is_some() {
            return Err(VaultError::AccountAlreadyInitialized { address: state_key });
        }

        let addresses = self.addresses(&state_key)?;
        let ix = self.instructions.initialize(&owner.pubkey(), &addresses);
        let signature = self
            .send(&[ix], owner, &[owner, vault_state])
            .await
            .map_err(|err| already_in_use(err, state_key))?;

        info!(%signature, vault_auth = %addresses.vault_auth, vault = %addresses.vault, "vault initialized");
        Ok(VaultReceipt {
            signature,
            addresses,
        })
    }

    /// Initialize a vault at a newly generated vault-state keypair.
    pub async fn initialize_fresh(&self, owner: &dyn Signer) -> Result<(Keypair, VaultReceipt)> {
        let vault_state = Keypair::new();
        let receipt = self.initialize(owner, &vault_state).await?;
        Ok((vault_state, receipt))
    }

    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state, amount = amount))]
    pub async fn deposit(&self, owner: &dyn Signer, vault_state: &Pubkey, amount: u64) -> Result<VaultReceipt> {
        let addresses = self.addresses(vault_state)?;
        let ix = self.instructions.deposit(&owner.pubkey(), &addresses, amount)?;
        let signature = self.send(&[ix], owner, &[owner]).await?;
        Ok(VaultReceipt {
            signature,
            addresses,
        })
    }

    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state, amount = amount))]
    pub async fn withdraw(&self, owner: &dyn Signer, vault_state: &Pubkey, amount: u64) -> Result<VaultReceipt> {
        let addresses = self.addresses(vault_state)?;
        let ix = self.instructions.withdraw(&owner.pubkey(), &addresses, amount)?;
        let signature = self.send(&[ix], owner, &[owner]).await?;
        Ok(VaultReceipt {
            signature,
            addresses,
        })
    }

    /// Deposit `amount` base units of `mint`. Once the amount is checked,
    /// both token accounts are resolved and created if missing, with `owner`
    /// paying rent.
    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state, mint = %mint, amount = amount))]
    pub async fn deposit_spl(
        &self,
        owner: &dyn Signer,
        vault_state: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<TokenTransferReceipt> {
        check_amount(VaultInstructionKind::DepositSpl, amount)?;
        let addresses = self.addresses(vault_state)?;
        let (owner_ata, vault_ata) = self.resolve_token_accounts(owner, &addresses, mint).await?;
        let ix = self.instructions.deposit_spl(
            &owner.pubkey(),
            owner_ata.account(),
            &addresses,
            vault_ata.account(),
            mint,
            amount,
        )?;
        let signature = self.send(&[ix], owner, &[owner]).await?;
        Ok(TokenTransferReceipt {
            signature,
            addresses,
            owner_ata,
            vault_ata,
        })
    }

    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state, mint = %mint, amount = amount))]
    pub async fn withdraw_spl(
        &self,
        owner: &dyn Signer,
        vault_state: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<TokenTransferReceipt> {
        check_amount(VaultInstructionKind::WithdrawSpl, amount)?;
        let addresses = self.addresses(vault_state)?;
        let (owner_ata, vault_ata) = self.resolve_token_accounts(owner, &addresses, mint).await?;
        let ix = self.instructions.withdraw_spl(
            &owner.pubkey(),
            owner_ata.account(),
            &addresses,
            vault_ata.account(),
            mint,
            amount,
        )?;
        let signature = self.send(&[ix], owner, &[owner]).await?;
        Ok(TokenTransferReceipt {
            signature,
            addresses,
            owner_ata,
            vault_ata,
        })
    }

    /// Close the vault state and return its lamports to `owner`.
    #[instrument(skip_all, fields(owner = %owner.pubkey(), vault_state = %vault_state))]
    pub async fn close(&self, owner: &dyn Signer, vault_state: &Pubkey) -> Result<VaultReceipt> {
        let addresses = self.addresses(vault_state)?;
        let ix = self.instructions.close_account(&owner.pubkey(), &addresses);
        let signature = self.send(&[ix], owner, &[owner]).await?;
        Ok(VaultReceipt {
            signature,
            addresses,
        })
    }

    /// The owner's account is a wallet ATA; the vault's belongs to the
    /// authority PDA and so needs `allow_owner_off_curve`.
    async fn resolve_token_accounts(
        &self,
        owner: &dyn Signer,
        addresses: &VaultAddresses,
        mint: &Pubkey,
    ) -> Result<(Resolution, Resolution)> {
        let resolver = self.token_resolver(owner);
        let owner_ata = resolver.resolve(&owner.pubkey(), mint, false).await?;
        let vault_ata = resolver.resolve(&addresses.vault_auth, mint, true).await?;
        Ok((owner_ata, vault_ata))
    }

    async fn send(&self, instructions: &[Instruction], fee_payer: &dyn Signer, signers: &[&dyn Signer]) -> Result<Signature> {
        self.submitter()
            .submit(instructions, &fee_payer.pubkey(), signers)
            .await
    }
}

/// The system program refuses `create_account` on a used address; surface
/// that as the vault already existing.
fn already_in_use(err: VaultError, vault_state: Pubkey) -> VaultError {
    match err {
        VaultError::SubmissionRejected {
            reason:
                TransactionError::InstructionError(
                    _,
                    InstructionError::Custom(SYSTEM_ERROR_ACCOUNT_ALREADY_IN_USE)
                    | InstructionError::AccountAlreadyInitialized,
                ),
            ..
        } => VaultError::AccountAlreadyInitialized {
            address: vault_state,
        },
        other => other,
    }
}
