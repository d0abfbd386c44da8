//! Application configuration loaded from environment variables.

use std::str::FromStr;

use crate::errors::{IndexerError, Result};
use crate::events::EventSource;

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g. https://soroban-testnet.stellar.org)
    pub rpc_url: String,
    /// Milestone escrow contract address (Strkey format)
    pub escrow_contract_id: String,
    /// Milestone governance contract address (Strkey format)
    pub governance_contract_id: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) to poll the RPC for new events
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://soroban-testnet.stellar.org".to_string()),
            escrow_contract_id: required(&lookup, "ESCROW_CONTRACT_ID")?,
            governance_contract_id: required(&lookup, "GOVERNANCE_CONTRACT_ID")?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./milestone_events.db".to_string()),
            api_port: parsed(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parsed(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parsed(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parsed(&lookup, "START_LEDGER", 0)?,
        })
    }

    /// Both watched contract ids, in the order passed to `getEvents`.
    pub fn contract_ids(&self) -> [&str; 2] {
        [
            self.escrow_contract_id.as_str(),
            self.governance_contract_id.as_str(),
        ]
    }

    /// Which watched contract `contract_id` is, if any.
    pub fn source_of(&self, contract_id: &str) -> Option<EventSource> {
        if contract_id == self.escrow_contract_id {
            Some(EventSource::Escrow)
        } else if contract_id == self.governance_contract_id {
            Some(EventSource::Governance)
        } else {
            None
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| IndexerError::Config(format!("{key} environment variable is required")))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}"))),
        None => Ok(default),
    }
}
