//! # wba-vault-client
//!
//! Rust client for the **WBA vault** program on Solana.
//!
//! # Features
//!
//! - PDA derivation for the vault authority and native vault
//! - Type-safe instruction builders (initialize, deposit, withdraw, SPL variants, close)
//! - Associated token account resolution with on-demand creation
//! - Transaction submission with bounded confirmation waits
//!
//! # Example
//!
//! ```no_run
//! use wba_vault_client::{rpc_client, VaultClient, VaultConfig};
//! use solana_sdk::signature::Keypair;
//!
//! # async fn run() -> wba_vault_client::Result<()> {
//! let config = VaultConfig::devnet();
//! let client = VaultClient::new(rpc_client(&config), config);
//! let owner = Keypair::new();
//!
//! let (vault_state, init) = client.initialize_fresh(&owner).await?;
//! let deposit = client.deposit(&owner, &init.addresses.vault_state, 333_300_000).await?;
//! # let _ = (vault_state, deposit);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod instructions;
pub mod pda;
pub mod rpc;
pub mod state;
pub mod submit;
pub mod token_account;

pub use client::*;
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use instructions::*;
pub use pda::*;
pub use rpc::*;
pub use state::*;
pub use submit::*;
pub use token_account::*;
