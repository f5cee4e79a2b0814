//! Constants for the WBA vault client.

use solana_sdk::pubkey::Pubkey;

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Seed for the vault authority PDA: ["auth", vault_state]
pub const VAULT_AUTH_SEED: &[u8] = b"auth";

/// Seed for the native vault PDA: ["vault", vault_auth]
pub const VAULT_SEED: &[u8] = b"vault";

// =============================================================================
// PROGRAM IDS
// =============================================================================

/// WBA vault program on devnet (D51uEDHLbWAxNfodfQDv7qkp8WZtxrhi3uganGbNos7o)
pub const VAULT_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("D51uEDHLbWAxNfodfQDv7qkp8WZtxrhi3uganGbNos7o");

/// SPL Token program (TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA)
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

/// Associated Token Account program (ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL)
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = spl_associated_token_account::ID;

// =============================================================================
// NETWORK
// =============================================================================

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Upper bound on waiting for a submitted transaction to reach the commitment.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// SYSTEM PROGRAM
// =============================================================================

/// System program custom error raised when `create_account` targets a used address.
pub const SYSTEM_ERROR_ACCOUNT_ALREADY_IN_USE: u32 = 0;
