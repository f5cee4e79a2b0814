//! Error definitions for the vault client.

use std::time::Duration;

use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::TransactionError};
use thiserror::Error;

use crate::instructions::VaultInstructionKind;

pub type Result<T> = std::result::Result<T, VaultError>;

/// How a caller should react to a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Detected before any network call. Never retried.
    LocalValidation,
    /// Safe to retry with fresh inputs (new blockhash, reachable endpoint).
    Transient,
    /// The network refused this input set. Retrying repeats the failure.
    Rejected,
    /// The outcome is unknown. Re-query by signature before resubmitting.
    Indeterminate,
}

#[derive(Error, Debug)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // Local validation
    // -------------------------------------------------------------------------
    #[error("Seeds too long: {seeds} seeds, longest {longest} bytes")]
    SeedsTooLong { seeds: usize, longest: usize },

    #[error("Bump {bump} yields an on-curve address for program {program_id}")]
    InvalidBump { program_id: Pubkey, bump: u8 },

    #[error("Owner {owner} is off curve; token account requires allow_owner_off_curve")]
    InvalidOwnerForAccount { owner: Pubkey },

    #[error("Invalid amount for {kind}: must be greater than zero")]
    InvalidAmount { kind: VaultInstructionKind },

    #[error("Mint mismatch on token account {account}: expected {expected}, found {found}")]
    MintMismatch {
        account: Pubkey,
        expected: Pubkey,
        found: Pubkey,
    },

    #[error("Token account {account} is owned by {found}, expected {expected}")]
    TokenOwnerMismatch {
        account: Pubkey,
        expected: Pubkey,
        found: Pubkey,
    },

    #[error("Missing signature for required signer {signer}")]
    MissingSignature { signer: Pubkey },

    #[error("Signer {signer} is not required by any instruction")]
    UnexpectedSigner { signer: Pubkey },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Transient network failures
    // -------------------------------------------------------------------------
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Blockhash {blockhash} expired before the transaction landed")]
    StaleFreshnessToken { blockhash: Hash },

    #[error("RPC error: {0}")]
    Rpc(String),

    // -------------------------------------------------------------------------
    // Network rejections
    // -------------------------------------------------------------------------
    #[error("No off-curve bump found for program {program_id}")]
    DerivationExhausted { program_id: Pubkey },

    #[error("Transaction rejected: {reason}")]
    SubmissionRejected {
        signature: Option<Signature>,
        reason: TransactionError,
    },

    #[error("Account {address} already initialized")]
    AccountAlreadyInitialized { address: Pubkey },

    #[error("Creation of token account {address} rejected: {reason}")]
    AccountCreationRejected { address: Pubkey, reason: String },

    #[error("Account {address} exists but is bound to owner {owner} / mint {mint}")]
    TokenAccountMismatch {
        address: Pubkey,
        owner: Pubkey,
        mint: Pubkey,
    },

    #[error("Invalid account data at {address}: {reason}")]
    InvalidAccountData { address: Pubkey, reason: String },

    // -------------------------------------------------------------------------
    // Indeterminate
    // -------------------------------------------------------------------------
    #[error("Transaction {signature} not confirmed after {waited:?}; outcome unknown")]
    ConfirmationTimeout {
        signature: Signature,
        waited: Duration,
    },
}

impl VaultError {
    pub fn class(&self) -> ErrorClass {
        match self {
            VaultError::SeedsTooLong { .. }
            | VaultError::InvalidBump { .. }
            | VaultError::InvalidOwnerForAccount { .. }
            | VaultError::InvalidAmount { .. }
            | VaultError::MintMismatch { .. }
            | VaultError::TokenOwnerMismatch { .. }
            | VaultError::MissingSignature { .. }
            | VaultError::UnexpectedSigner { .. }
            | VaultError::Signing(_)
            | VaultError::Config(_) => ErrorClass::LocalValidation,

            VaultError::NetworkUnavailable(_)
            | VaultError::StaleFreshnessToken { .. }
            | VaultError::Rpc(_) => ErrorClass::Transient,

            VaultError::DerivationExhausted { .. }
            | VaultError::SubmissionRejected { .. }
            | VaultError::AccountAlreadyInitialized { .. }
            | VaultError::AccountCreationRejected { .. }
            | VaultError::TokenAccountMismatch { .. }
            | VaultError::InvalidAccountData { .. } => ErrorClass::Rejected,

            VaultError::ConfirmationTimeout { .. } => ErrorClass::Indeterminate,
        }
    }

    /// True when retrying with fresh inputs may succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    pub fn is_indeterminate(&self) -> bool {
        self.class() == ErrorClass::Indeterminate
    }
}
