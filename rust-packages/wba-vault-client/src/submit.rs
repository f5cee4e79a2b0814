//! Transaction submission and confirmation.

use std::collections::BTreeSet;
use std::time::Duration;

use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};
use crate::rpc::{SignatureState, VaultRpc};

/// Every key that must sign: the fee payer first, then each `is_signer` meta
/// in instruction order.
pub fn required_signers(instructions: &[Instruction], fee_payer: &Pubkey) -> Vec<Pubkey> {
    let mut seen = BTreeSet::new();
    std::iter::once(*fee_payer)
        .chain(
            instructions
                .iter()
                .flat_map(|ix| ix.accounts.iter())
                .filter(|meta| meta.is_signer)
                .map(|meta| meta.pubkey),
        )
        .filter(|key| seen.insert(*key))
        .collect()
}

/// The provided signers must be exactly the required set.
pub fn check_signers(instructions: &[Instruction], fee_payer: &Pubkey, signers: &[&dyn Signer]) -> Result<()> {
    let required = required_signers(instructions, fee_payer);
    let provided: BTreeSet<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();

    if let Some(missing) = required.iter().find(|key| !provided.contains(key)) {
        return Err(VaultError::MissingSignature { signer: *missing });
    }
    if let Some(extra) = provided.iter().find(|key| !required.contains(key)) {
        return Err(VaultError::UnexpectedSigner { signer: *extra });
    }
    Ok(())
}

/// Signs, sends, and waits for one transaction at a time. Never retries.
pub struct TransactionSubmitter<'a, R> {
    rpc: &'a R,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl<'a, R: VaultRpc> TransactionSubmitter<'a, R> {
    pub fn new(rpc: &'a R, config: &VaultConfig) -> Self {
        Self {
            rpc,
            commitment: config.commitment.to_config(),
            confirm_timeout: config.confirm_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Submit `instructions` atomically and wait for the configured
    /// commitment. Signer coverage is checked before the first network call.
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        signers: &[&dyn Signer],
    ) -> Result<Signature> {
        check_signers(instructions, fee_payer, signers)?;

        let blockhash = self.rpc.latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(instructions, Some(fee_payer));
        transaction
            .try_sign(signers, blockhash)
            .map_err(|e| VaultError::Signing(e.to_string()))?;

        let signature = self.rpc.send(&transaction).await?;
        info!(%signature, %fee_payer, instructions = instructions.len(), "transaction sent");

        self.confirm(&signature, &blockhash).await?;
        Ok(signature)
    }

    /// Poll until `signature` reaches the commitment, fails, or the timeout
    /// elapses. Status query failures are logged and polling continues. Each
    /// query is cut off at the deadline.
    ///
    /// At the deadline an expired `blockhash` with no record of the signature
    /// means the transaction can never land, reported as
    /// [`VaultError::StaleFreshnessToken`]. Anything else is
    /// [`VaultError::ConfirmationTimeout`].
    pub async fn confirm(&self, signature: &Signature, blockhash: &Hash) -> Result<()> {
        let started = Instant::now();
        loop {
            let remaining = self.confirm_timeout.saturating_sub(started.elapsed());
            if let Some(SignatureState::Confirmed) = self.poll(signature, remaining).await? {
                info!(%signature, elapsed = ?started.elapsed(), "transaction confirmed");
                return Ok(());
            }

            let waited = started.elapsed();
            if waited >= self.confirm_timeout {
                return self.settle_expired(signature, blockhash, waited).await;
            }
            sleep(self.poll_interval.min(self.confirm_timeout - waited)).await;
        }
    }

    /// One status query bounded by `limit`. `None` when the query failed or
    /// ran out of time.
    async fn poll(&self, signature: &Signature, limit: Duration) -> Result<Option<SignatureState>> {
        match timeout(limit, self.rpc.signature_state(signature, self.commitment)).await {
            Ok(Ok(SignatureState::Failed(reason))) => {
                warn!(%signature, %reason, "transaction failed on chain");
                Err(VaultError::SubmissionRejected {
                    signature: Some(*signature),
                    reason,
                })
            }
            Ok(Ok(state)) => {
                debug!(%signature, ?state, "signature status");
                Ok(Some(state))
            }
            Ok(Err(err)) => {
                warn!(%signature, error = %err, "signature status query failed");
                Ok(None)
            }
            Err(_) => {
                warn!(%signature, ?limit, "signature status query did not answer in time");
                Ok(None)
            }
        }
    }

    async fn settle_expired(&self, signature: &Signature, blockhash: &Hash, waited: Duration) -> Result<()> {
        let validity = timeout(
            self.poll_interval,
            self.rpc.is_blockhash_valid(blockhash, CommitmentConfig::processed()),
        )
        .await;

        if let Ok(Ok(false)) = validity {
            match self.poll(signature, self.poll_interval).await? {
                Some(SignatureState::Confirmed) => {
                    info!(%signature, "transaction confirmed at deadline");
                    return Ok(());
                }
                Some(SignatureState::Unknown) => {
                    warn!(%signature, %blockhash, "blockhash expired before the transaction landed");
                    return Err(VaultError::StaleFreshnessToken { blockhash: *blockhash });
                }
                _ => {}
            }
        }

        warn!(%signature, ?waited, "confirmation timed out");
        Err(VaultError::ConfirmationTimeout {
            signature: *signature,
            waited,
        })
    }
}
