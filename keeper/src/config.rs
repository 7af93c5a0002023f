//! Keeper configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL for Solana cluster
    pub rpc_url: String,

    /// Pool program ID
    #[serde(with = "base58")]
    pub pool_program: Pubkey,

    /// Owner wallet keypair path
    pub keypair_path: String,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Submit ConvertAll as soon as the pool allows it
    pub auto_convert: bool,

    /// Pool token account holding the settlement asset
    #[serde(with = "base58")]
    pub pool_settlement: Pubkey,

    /// Extra accounts the settlement program needs for DepositNative (writable)
    #[serde(default, with = "base58::list")]
    pub settlement_accounts: Vec<Pubkey>,
}

/// Pubkeys as base58 strings in TOML
mod base58 {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let text = String::deserialize(d)?;
        Pubkey::from_str(&text).map_err(D::Error::custom)
    }

    pub mod list {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S: Serializer>(keys: &[Pubkey], s: S) -> Result<S::Ok, S::Error> {
            let mut seq = s.serialize_seq(Some(keys.len()))?;
            for key in keys {
                seq.serialize_element(&key.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Pubkey>, D::Error> {
            Vec::<String>::deserialize(d)?
                .iter()
                .map(|text| Pubkey::from_str(text).map_err(D::Error::custom))
                .collect()
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config TOML")
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            pool_program: Pubkey::new_from_array(prelaunch_pool::ID),
            keypair_path: "~/.config/solana/id.json".to_string(),
            poll_interval_secs: 30,
            auto_convert: false,
            pool_settlement: Pubkey::default(),
            settlement_accounts: Vec::new(),
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
