//! Failures of the milestone indexer.
//!
//! Transport and storage errors convert in with `?`. Decoding errors are
//! per event: [`crate::rpc::decode_events`] logs and skips them so one bad
//! event never stalls the poll loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("sqlite: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Transport-level failure talking to the Soroban RPC.
    #[error("rpc transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc body is not JSON-RPC: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed environment variable.
    #[error("config: {0}")]
    Config(String),

    /// Error the RPC will return again on retry (bad request, unknown method).
    #[error("getEvents rejected with code {code}: {message}")]
    RpcRejected { code: i64, message: String },

    #[error("getEvents response has neither result nor error")]
    EmptyResponse,

    /// Event from a contract that is neither the escrow nor the governance one.
    #[error("event from unwatched contract {0}")]
    UnwatchedContract(String),

    #[error("event {0} carries no contract id")]
    MissingContract(String),

    #[error("event {0} has no topics")]
    MissingTopic(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
