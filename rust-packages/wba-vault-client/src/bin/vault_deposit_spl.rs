//! Deposit SPL tokens into an existing vault, creating token accounts as needed.

mod common;

use tracing::info;
use wba_vault_client::{rpc_client, VaultClient, VaultConfig};

const DEFAULT_AMOUNT: u64 = 10_000_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_tracing();
    let config = VaultConfig::from_env()?;
    let owner = common::load_keypair()?;
    let vault_state = common::pubkey_var("VAULT_STATE")?;
    let mint = common::pubkey_var("VAULT_MINT")?;
    let amount = common::amount_var(DEFAULT_AMOUNT)?;
    let client = VaultClient::new(rpc_client(&config), config);

    let receipt = client.deposit_spl(&owner, &vault_state, &mint, amount).await?;
    info!(
        %vault_state,
        %mint,
        amount,
        owner_ata = %receipt.owner_ata.address(),
        vault_ata = %receipt.vault_ata.address(),
        signature = %receipt.signature,
        "token deposit confirmed"
    );
    Ok(())
}
