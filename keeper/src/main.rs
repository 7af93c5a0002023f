//! Prelaunch Pool Operator Keeper
//!
//! Off-chain service that watches the pool config, reports lifecycle changes
//! and submits the bulk conversion of the native leg once the pool allows it.
//!
//! Usage:
//!   prelaunch-keeper                 run the polling loop
//!   prelaunch-keeper activate        submit Activate once and exit
//!   prelaunch-keeper init-config P   write a default config to P

mod config;
mod pool_view;
mod tx_builder;

use anyhow::{bail, Context, Result};
use config::Config;
use model_safety::lifecycle::Phase;
use pool_view::{Action, PoolView};
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, path] = args.as_slice() {
        if cmd == "init-config" {
            return Config::write_default(path);
        }
    }

    log::info!("Starting Prelaunch Pool Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default devnet config", e);
        Config::default_devnet()
    });

    log::info!("Connected to RPC: {}", config.rpc_url);
    log::info!("Watching pool program: {}", config.pool_program);

    let client = RpcClient::new_with_commitment(
        config.rpc_url.clone(),
        CommitmentConfig::confirmed(),
    );

    let owner = load_keypair(&config.keypair_path)?;
    log::info!("Owner wallet: {}", owner.pubkey());

    match args.first().map(String::as_str) {
        None => {}
        Some("activate") => {
            let ix = tx_builder::build_activate_instruction(&config.pool_program, &owner.pubkey());
            let signature = submit(&client, &owner, ix)?;
            log::info!("Activation submitted: {}", signature);
            return Ok(());
        }
        Some(other) => bail!("Unknown command: {}", other),
    }

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));
    let mut last_phase: Option<Phase> = None;

    loop {
        interval.tick().await;

        match poll(&client, &config, &owner, last_phase) {
            Ok(phase) => last_phase = Some(phase),
            Err(e) => log::error!("Error polling pool: {:#}", e),
        }
    }
}

/// One round: fetch, report, act. Returns the observed phase.
fn poll(client: &RpcClient, config: &Config, owner: &Keypair, last_phase: Option<Phase>) -> Result<Phase> {
    let now = cluster_time(client)?;
    let view = fetch_pool(client, &config.pool_program)?;
    let phase = view.phase(now);

    if last_phase != Some(phase) {
        match view.seconds_to_claims(now) {
            Some(secs) if secs > 0 => log::info!("Pool phase: {:?} (claims open in {}s)", phase, secs),
            _ => log::info!("Pool phase: {:?}", phase),
        }
    }

    if view.owner() != owner.pubkey() {
        log::debug!("Keeper wallet is not the pool owner; observing only");
        return Ok(phase);
    }

    if let Some(Action::ConvertAll) = view.next_action(now, config.auto_convert) {
        log::info!(
            "Converting native leg ({} lamports)",
            view.config.total_native_locked
        );
        let ix = tx_builder::build_convert_all_instruction(
            &config.pool_program,
            &owner.pubkey(),
            &config.pool_settlement,
            &Pubkey::new_from_array(view.config.settlement_program),
            &config.settlement_accounts,
        );
        match submit(client, owner, ix) {
            Ok(signature) => log::info!("ConvertAll submitted: {}", signature),
            Err(e) => log::error!("ConvertAll failed: {:#}", e),
        }
    }

    Ok(phase)
}

fn fetch_pool(client: &RpcClient, program: &Pubkey) -> Result<PoolView> {
    let address = tx_builder::pool_address(program);
    let account = client
        .get_account(&address)
        .context(format!("Failed to fetch pool account {}", address))?;
    Ok(PoolView::decode(&account.owner, program, &account.data)?)
}

/// Unix time of the latest confirmed block
fn cluster_time(client: &RpcClient) -> Result<i64> {
    let slot = client.get_slot().context("Failed to fetch slot")?;
    client
        .get_block_time(slot)
        .context(format!("Failed to fetch block time for slot {}", slot))
}

fn submit(client: &RpcClient, owner: &Keypair, ix: Instruction) -> Result<String> {
    let blockhash = client
        .get_latest_blockhash()
        .context("Failed to fetch blockhash")?;
    let tx = tx_builder::build_transaction(ix, owner, blockhash)?;
    let signature = client
        .send_and_confirm_transaction(&tx)
        .context("Transaction failed")?;
    Ok(signature.to_string())
}

/// Load owner keypair from file
fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded_path = shellexpand::tilde(path);
    let bytes = std::fs::read(expanded_path.as_ref())
        .context(format!("Failed to read keypair from {}", path))?;

    let keypair = if bytes.first() == Some(&b'[') {
        // JSON format
        let json_data: Vec<u8> = serde_json::from_slice(&bytes)
            .context("Failed to parse keypair JSON")?;
        Keypair::try_from(&json_data[..])
            .context("Failed to create keypair from bytes")?
    } else {
        // Binary format
        Keypair::try_from(&bytes[..])
            .context("Failed to create keypair from bytes")?
    };

    Ok(keypair)
}
