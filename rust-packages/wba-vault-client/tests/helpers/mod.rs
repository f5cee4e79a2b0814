//! In-memory cluster for integration tests.
//!
//! Applies just enough of the ATA and vault programs' effects to exercise the
//! client: ATA creation writes a token account, vault `initialize` writes a
//! `VaultState` record. Every trait call is counted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use spl_token::state::{Account as SplTokenAccount, AccountState};
use wba_vault_client::{
    Result, SignatureState, VaultConfig, VaultError, VaultInstructionKind, VaultRpc, VaultStateAccount,
    ASSOCIATED_TOKEN_PROGRAM_ID,
};

pub const RENT_EXEMPT_TOKEN_ACCOUNT: u64 = 2_039_280;

#[derive(Default)]
struct Inner {
    accounts: HashMap<Pubkey, Account>,
    blockhash: Hash,
    sent: Vec<Transaction>,
    network_calls: usize,
    offline: bool,
    send_error: Option<TransactionError>,
    landing_error: Option<TransactionError>,
    never_confirm: bool,
    blockhash_expired: bool,
    status_error: bool,
    status_hangs: bool,
}

pub struct FakeCluster {
    config: VaultConfig,
    inner: RefCell<Inner>,
}

impl FakeCluster {
    pub fn new(config: &VaultConfig) -> Self {
        let inner = Inner {
            blockhash: Hash::new_unique(),
            ..Inner::default()
        };
        Self {
            config: config.clone(),
            inner: RefCell::new(inner),
        }
    }

    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.inner.borrow_mut().accounts.insert(address, account);
    }

    pub fn insert_token_account(&self, address: Pubkey, owner: &Pubkey, mint: &Pubkey) {
        let account = token_account(&self.config.token_program_id, owner, mint);
        self.insert_account(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.inner.borrow().accounts.get(address).cloned()
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// Refuse the next sends at preflight with `err`.
    pub fn reject_sends_with(&self, err: TransactionError) {
        self.inner.borrow_mut().send_error = Some(err);
    }

    /// Accept sends, then report them as failed on chain.
    pub fn fail_on_chain_with(&self, err: TransactionError) {
        self.inner.borrow_mut().landing_error = Some(err);
    }

    pub fn never_confirm(&self) {
        self.inner.borrow_mut().never_confirm = true;
    }

    /// Report every blockhash as no longer valid.
    pub fn expire_blockhash(&self) {
        self.inner.borrow_mut().blockhash_expired = true;
    }

    /// Fail every signature status query.
    pub fn fail_status_queries(&self) {
        self.inner.borrow_mut().status_error = true;
    }

    /// Never answer signature status queries.
    pub fn hang_status_queries(&self) {
        self.inner.borrow_mut().status_hangs = true;
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.inner.borrow().sent.clone()
    }

    pub fn network_calls(&self) -> usize {
        self.inner.borrow().network_calls
    }

    pub fn blockhash(&self) -> Hash {
        self.inner.borrow().blockhash
    }

    fn enter(&self) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.network_calls += 1;
        if inner.offline {
            return Err(VaultError::NetworkUnavailable("connection refused".into()));
        }
        Ok(())
    }

    fn apply(&self, transaction: &Transaction) {
        let mut inner = self.inner.borrow_mut();
        for ix in transaction.message.instructions.iter() {
            let keys: Vec<Pubkey> = ix
                .accounts
                .iter()
                .map(|&i| transaction.message.account_keys[i as usize])
                .collect();
            let program_id = transaction.message.account_keys[ix.program_id_index as usize];

            if program_id == ASSOCIATED_TOKEN_PROGRAM_ID {
                // payer, ata, owner, mint, system, token
                let account = token_account(&self.config.token_program_id, &keys[2], &keys[3]);
                inner.accounts.entry(keys[1]).or_insert(account);
            } else if program_id == self.config.vault_program_id
                && ix.data[..8] == VaultInstructionKind::Initialize.discriminator()
            {
                // owner, vault_state, vault_auth, vault, system
                let state = VaultStateAccount {
                    owner: keys[0],
                    auth_bump: 0,
                    vault_bump: 0,
                    score: 0,
                };
                let account = Account {
                    lamports: 1_000_000,
                    data: state.to_account_data().unwrap(),
                    owner: self.config.vault_program_id,
                    executable: false,
                    rent_epoch: 0,
                };
                inner.accounts.insert(keys[1], account);
            }
        }
    }
}

pub fn token_account(token_program_id: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Account {
    let state = SplTokenAccount {
        mint: *mint,
        owner: *owner,
        state: AccountState::Initialized,
        ..SplTokenAccount::default()
    };
    let mut data = vec![0u8; SplTokenAccount::LEN];
    SplTokenAccount::pack(state, &mut data).unwrap();
    Account {
        lamports: RENT_EXEMPT_TOKEN_ACCOUNT,
        data,
        owner: *token_program_id,
        executable: false,
        rent_epoch: 0,
    }
}

impl VaultRpc for FakeCluster {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.enter()?;
        Ok(self.inner.borrow().blockhash)
    }

    async fn is_blockhash_valid(&self, blockhash: &Hash, _commitment: CommitmentConfig) -> Result<bool> {
        self.enter()?;
        let inner = self.inner.borrow();
        Ok(!inner.blockhash_expired && *blockhash == inner.blockhash)
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.enter()?;
        Ok(self.account(address))
    }

    async fn send(&self, transaction: &Transaction) -> Result<Signature> {
        self.enter()?;
        assert!(transaction.is_signed(), "fake cluster received an unsigned transaction");
        self.inner.borrow_mut().sent.push(transaction.clone());

        let send_error = self.inner.borrow().send_error.clone();
        match send_error {
            Some(TransactionError::BlockhashNotFound) => {
                return Err(VaultError::StaleFreshnessToken {
                    blockhash: transaction.message.recent_blockhash,
                })
            }
            Some(reason) => {
                return Err(VaultError::SubmissionRejected {
                    signature: None,
                    reason,
                })
            }
            None => {}
        }

        if self.inner.borrow().landing_error.is_none() {
            self.apply(transaction);
        }
        Ok(transaction.signatures[0])
    }

    async fn signature_state(&self, signature: &Signature, _commitment: CommitmentConfig) -> Result<SignatureState> {
        self.enter()?;
        let hangs = self.inner.borrow().status_hangs;
        if hangs {
            std::future::pending::<()>().await;
        }
        let inner = self.inner.borrow();
        if inner.status_error {
            return Err(VaultError::Rpc("status query failed".into()));
        }
        if !inner.sent.iter().any(|tx| tx.signatures.first() == Some(signature)) {
            return Ok(SignatureState::Unknown);
        }
        if inner.never_confirm {
            return Ok(SignatureState::Unknown);
        }
        let state = match &inner.landing_error {
            Some(err) => SignatureState::Failed(err.clone()),
            None => SignatureState::Confirmed,
        };
        Ok(state)
    }
}
