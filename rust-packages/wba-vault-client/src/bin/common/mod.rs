//! Shared setup for the vault binaries. Inputs come from `VAULT_*`
//! environment variables (a `.env` file is honoured).

#![allow(dead_code)]

use std::str::FromStr;

use anyhow::{anyhow, Context};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_KEYPAIR_PATH: &str = "wba-wallet.json";

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn load_keypair() -> anyhow::Result<Keypair> {
    let path = std::env::var("VAULT_KEYPAIR").unwrap_or_else(|_| DEFAULT_KEYPAIR_PATH.into());
    read_keypair_file(&path).map_err(|e| anyhow!("reading keypair {path}: {e}"))
}

pub fn pubkey_var(name: &str) -> anyhow::Result<Pubkey> {
    let value = std::env::var(name).with_context(|| format!("{name} is not set"))?;
    Pubkey::from_str(value.trim()).with_context(|| format!("{name} is not a valid pubkey"))
}

pub fn amount_var(default: u64) -> anyhow::Result<u64> {
    match std::env::var("VAULT_AMOUNT") {
        Ok(value) => value.trim().parse().context("VAULT_AMOUNT is not a u64"),
        Err(_) => Ok(default),
    }
}
