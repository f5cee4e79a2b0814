//! Deposit lamports into an existing vault.

mod common;

use tracing::info;
use wba_vault_client::{rpc_client, VaultClient, VaultConfig};

const DEFAULT_AMOUNT: u64 = 333_300_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_tracing();
    let config = VaultConfig::from_env()?;
    let owner = common::load_keypair()?;
    let vault_state = common::pubkey_var("VAULT_STATE")?;
    let amount = common::amount_var(DEFAULT_AMOUNT)?;
    let client = VaultClient::new(rpc_client(&config), config);

    let receipt = client.deposit(&owner, &vault_state, amount).await?;
    info!(%vault_state, amount, signature = %receipt.signature, "deposit confirmed");
    Ok(())
}
