//! Initialize a vault at a freshly generated vault-state keypair.

mod common;

use solana_sdk::signature::Signer;
use tracing::info;
use wba_vault_client::{rpc_client, VaultClient, VaultConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_tracing();
    let config = VaultConfig::from_env()?;
    let owner = common::load_keypair()?;
    let client = VaultClient::new(rpc_client(&config), config);

    let (vault_state, receipt) = client.initialize_fresh(&owner).await?;
    info!(
        vault_state = %vault_state.pubkey(),
        vault_auth = %receipt.addresses.vault_auth,
        vault = %receipt.addresses.vault,
        signature = %receipt.signature,
        "vault initialized"
    );
    Ok(())
}
