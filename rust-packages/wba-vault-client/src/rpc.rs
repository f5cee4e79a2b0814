//! Network seam.
//!
//! Everything the client needs from a cluster goes through [`VaultRpc`]. The
//! production implementation is the nonblocking `RpcClient`; tests supply an
//! in-memory cluster.

use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};

use crate::config::VaultConfig;
use crate::errors::{Result, VaultError};

/// Where a submitted signature stands relative to the requested commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureState {
    /// The cluster has no record of the signature.
    Unknown,
    /// Landed, but below the requested commitment.
    Pending,
    Confirmed,
    /// Landed and failed; state changes were rolled back.
    Failed(TransactionError),
}

#[allow(async_fn_in_trait)]
pub trait VaultRpc {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Whether a transaction built on `blockhash` can still land.
    async fn is_blockhash_valid(&self, blockhash: &Hash, commitment: CommitmentConfig) -> Result<bool>;

    /// `Ok(None)` when the address holds no account.
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Submit a signed transaction without waiting for confirmation.
    async fn send(&self, transaction: &Transaction) -> Result<Signature>;

    async fn signature_state(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureState>;
}

/// Build an RPC client for the configured endpoint and commitment.
pub fn rpc_client(config: &VaultConfig) -> RpcClient {
    RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment.to_config())
}

fn map_client_error(err: ClientError) -> VaultError {
    if let Some(reason) = err.get_transaction_error() {
        return VaultError::SubmissionRejected {
            signature: None,
            reason,
        };
    }
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            VaultError::NetworkUnavailable(err.to_string())
        }
        _ => VaultError::Rpc(err.to_string()),
    }
}

impl VaultRpc for RpcClient {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.get_latest_blockhash().await.map_err(map_client_error)
    }

    async fn is_blockhash_valid(&self, blockhash: &Hash, commitment: CommitmentConfig) -> Result<bool> {
        RpcClient::is_blockhash_valid(self, blockhash, commitment)
            .await
            .map_err(map_client_error)
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.get_account_with_commitment(address, self.commitment())
            .await
            .map(|response| response.value)
            .map_err(map_client_error)
    }

    async fn send(&self, transaction: &Transaction) -> Result<Signature> {
        self.send_transaction(transaction)
            .await
            .map_err(|err| match map_client_error(err) {
                VaultError::SubmissionRejected {
                    reason: TransactionError::BlockhashNotFound,
                    ..
                } => VaultError::StaleFreshnessToken {
                    blockhash: transaction.message.recent_blockhash,
                },
                other => other,
            })
    }

    async fn signature_state(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<SignatureState> {
        let response = self
            .get_signature_statuses(&[*signature])
            .await
            .map_err(map_client_error)?;

        let state = match response.value.into_iter().next().flatten() {
            None => SignatureState::Unknown,
            Some(status) => match status.err.clone() {
                Some(err) => SignatureState::Failed(err),
                None if status.satisfies_commitment(commitment) => SignatureState::Confirmed,
                None => SignatureState::Pending,
            },
        };
        Ok(state)
    }
}
