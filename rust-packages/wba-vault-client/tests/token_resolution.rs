//! Associated token account resolution and SPL vault flows.

mod helpers;

use helpers::FakeCluster;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::TransactionError,
};
use wba_vault_client::{
    associated_token_address, compute_discriminator, Resolution, TokenAccountResolver, VaultAddresses, VaultClient,
    VaultConfig, VaultError, VaultInstructionKind, TOKEN_PROGRAM_ID, VAULT_PROGRAM_ID,
};

fn test_config() -> VaultConfig {
    VaultConfig {
        confirm_timeout_secs: 2,
        poll_interval_ms: 100,
        ..VaultConfig::devnet()
    }
}

fn ata(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    associated_token_address(owner, mint, &TOKEN_PROGRAM_ID)
}

// =============================================================================
// RESOLVER
// =============================================================================

#[tokio::test]
async fn test_resolve_creates_once_then_finds() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    let owner = Keypair::new().pubkey();
    let mint = Pubkey::new_unique();
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let first = resolver.resolve(&owner, &mint, false).await.unwrap();
    let second = resolver.resolve(&owner, &mint, false).await.unwrap();

    assert!(first.was_created());
    assert!(matches!(second, Resolution::Found(_)));
    assert_eq!(first.address(), second.address());
    assert_eq!(first.address(), ata(&owner, &mint));

    let sent = cluster.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.account_keys[0], payer.pubkey());
    if let Resolution::Created { signature, .. } = first {
        assert_eq!(signature, sent[0].signatures[0]);
    }
}

#[tokio::test]
async fn test_pda_owner_requires_off_curve_flag() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    let addrs = VaultAddresses::derive(&VAULT_PROGRAM_ID, &Pubkey::new_unique()).unwrap();
    let mint = Pubkey::new_unique();
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let err = resolver.resolve(&addrs.vault_auth, &mint, false).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidOwnerForAccount { owner } if owner == addrs.vault_auth));
    assert_eq!(cluster.network_calls(), 0);
    assert!(cluster.sent_transactions().is_empty());

    let resolved = resolver.resolve(&addrs.vault_auth, &mint, true).await.unwrap();
    assert!(resolved.was_created());
    assert_eq!(resolved.account().owner, addrs.vault_auth);
}

#[tokio::test]
async fn test_creation_rejection_names_the_account() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    let owner = Keypair::new().pubkey();
    let mint = Pubkey::new_unique();
    cluster.reject_sends_with(TransactionError::InsufficientFundsForRent { account_index: 0 });
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let err = resolver.resolve(&owner, &mint, false).await.unwrap_err();
    match err {
        VaultError::AccountCreationRejected { address, reason } => {
            assert_eq!(address, ata(&owner, &mint));
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_existing_account_with_other_binding_is_reported() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    let owner = Keypair::new().pubkey();
    let mint = Pubkey::new_unique();
    let stranger = Pubkey::new_unique();
    cluster.insert_token_account(ata(&owner, &mint), &stranger, &mint);
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let err = resolver.resolve(&owner, &mint, false).await.unwrap_err();
    assert!(matches!(err, VaultError::TokenAccountMismatch { owner: found, .. } if found == stranger));
    assert!(cluster.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_resolve_offline() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    cluster.set_offline(true);
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let err = resolver
        .resolve(&Keypair::new().pubkey(), &Pubkey::new_unique(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NetworkUnavailable(_)));
    assert!(err.is_retryable());
}

// =============================================================================
// SPL DEPOSIT
// =============================================================================

#[tokio::test]
async fn test_deposit_spl_resolves_both_accounts() {
    let config = test_config();
    let client = VaultClient::new(FakeCluster::new(&config), config);
    let owner = Keypair::new();
    let mint = Pubkey::new_unique();
    let (vault_state, _) = client.initialize_fresh(&owner).await.unwrap();

    let receipt = client
        .deposit_spl(&owner, &vault_state.pubkey(), &mint, 10_000_000)
        .await
        .unwrap();

    assert!(receipt.owner_ata.was_created());
    assert!(receipt.vault_ata.was_created());
    assert_eq!(receipt.owner_ata.address(), ata(&owner.pubkey(), &mint));
    assert_eq!(receipt.vault_ata.address(), ata(&receipt.addresses.vault_auth, &mint));

    // init + two ATA creations + deposit
    let sent = client.rpc().sent_transactions();
    assert_eq!(sent.len(), 4);
    let deposit_tx = sent.last().unwrap();
    assert_eq!(deposit_tx.signatures[0], receipt.signature);

    let ix = &deposit_tx.message.instructions[0];
    assert_eq!(&ix.data[..8], &compute_discriminator("deposit_spl"));
    assert_eq!(ix.data[8..], 10_000_000u64.to_le_bytes());

    // A second deposit reuses both accounts.
    let again = client
        .deposit_spl(&owner, &vault_state.pubkey(), &mint, 1)
        .await
        .unwrap();
    assert!(!again.owner_ata.was_created());
    assert!(!again.vault_ata.was_created());
    assert_eq!(client.rpc().sent_transactions().len(), 5);
}

#[tokio::test]
async fn test_zero_token_amount_touches_nothing() {
    let config = test_config();
    let client = VaultClient::new(FakeCluster::new(&config), config);
    let owner = Keypair::new();
    let mint = Pubkey::new_unique();
    let vault_state = Pubkey::new_unique();

    let err = client.deposit_spl(&owner, &vault_state, &mint, 0).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidAmount { kind: VaultInstructionKind::DepositSpl }));

    let err = client.withdraw_spl(&owner, &vault_state, &mint, 0).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidAmount { kind: VaultInstructionKind::WithdrawSpl }));

    // Neither token account exists, and neither was created.
    let addrs = client.addresses(&vault_state).unwrap();
    assert_eq!(client.rpc().network_calls(), 0);
    assert!(client.rpc().sent_transactions().is_empty());
    assert!(client.rpc().account(&ata(&owner.pubkey(), &mint)).is_none());
    assert!(client.rpc().account(&ata(&addrs.vault_auth, &mint)).is_none());
}

#[tokio::test]
async fn test_uninitialized_token_account_is_invalid_data() {
    let config = test_config();
    let cluster = FakeCluster::new(&config);
    let payer = Keypair::new();
    let owner = Keypair::new().pubkey();
    let mint = Pubkey::new_unique();
    let mut blank = helpers::token_account(&TOKEN_PROGRAM_ID, &owner, &mint);
    blank.data.iter_mut().for_each(|b| *b = 0);
    cluster.insert_account(ata(&owner, &mint), blank);
    let resolver = TokenAccountResolver::new(&cluster, &config, &payer);

    let err = resolver.resolve(&owner, &mint, false).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidAccountData { address, .. } if address == ata(&owner, &mint)));
    assert!(cluster.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_withdraw_spl_uses_same_accounts() {
    let config = test_config();
    let client = VaultClient::new(FakeCluster::new(&config), config);
    let owner = Keypair::new();
    let mint = Pubkey::new_unique();
    let vault_state = Pubkey::new_unique();

    let deposit = client.deposit_spl(&owner, &vault_state, &mint, 7).await.unwrap();
    let withdraw = client.withdraw_spl(&owner, &vault_state, &mint, 7).await.unwrap();

    assert_eq!(deposit.owner_ata.address(), withdraw.owner_ata.address());
    assert_eq!(deposit.vault_ata.address(), withdraw.vault_ata.address());
    assert!(matches!(withdraw.vault_ata, Resolution::Found(_)));
}
