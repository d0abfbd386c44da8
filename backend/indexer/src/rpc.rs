//! Soroban RPC client: polls `getEvents` and decodes milestone events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Topics
//!
//! Depending on the RPC version a topic arrives either as a JSON object
//! (`{"type":"symbol","value":"donated"}`) or as a base64 XDR `ScVal`. Only
//! the three `ScVal` shapes the contracts publish as topics are decoded:
//! symbols, `u32` stage indices and `u64` proposal ids.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, MilestoneEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// XDR `ScValType` discriminants.
const SCV_U32: u32 = 3;
const SCV_U64: u32 = 5;
const SCV_SYMBOL: u32 = 15;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topic list, JSON-encoded or base64 XDR
    pub topic: Vec<String>,
    /// Event data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events emitted by any of `contract_ids`.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_ids: &[&str],
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_ids, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let text = resp.text().await?;
                let body: RpcResponse = serde_json::from_str(&text)?;

                if let Some(err) = body.error {
                    // Invalid request / unknown method will never succeed.
                    if err.code == -32600 || err.code == -32601 {
                        return Err(IndexerError::RpcRejected {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or(IndexerError::EmptyResponse)?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(contract_ids: &[&str], start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": contract_ids
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`MilestoneEvent`]s. Events that cannot be
/// attributed to one of the two configured contracts are dropped.
pub fn decode_events(raw: &[RawEvent], config: &Config) -> Vec<MilestoneEvent> {
    raw.iter()
        .filter_map(|e| match decode_single(e, config) {
            Ok(event) => Some(event),
            Err(e @ IndexerError::UnwatchedContract(_)) => {
                debug!("Skipping: {e}");
                None
            }
            Err(e) => {
                warn!("Skipping: {e}");
                None
            }
        })
        .collect()
}

fn decode_single(raw: &RawEvent, config: &Config) -> Result<MilestoneEvent> {
    let label = || raw.id.clone().unwrap_or_else(|| "<no id>".to_string());
    let contract_id = raw
        .contract_id
        .clone()
        .ok_or_else(|| IndexerError::MissingContract(label()))?;
    let source = config
        .source_of(&contract_id)
        .ok_or_else(|| IndexerError::UnwatchedContract(contract_id.clone()))?;

    let first_topic = raw
        .topic
        .first()
        .ok_or_else(|| IndexerError::MissingTopic(label()))?;
    let kind = EventKind::from_topic(source, &decode_topic(first_topic).into_text());

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let subject_kind = kind.subject_kind();
    let subject = subject_kind
        .and_then(|_| raw.topic.get(1))
        .map(|t| decode_topic(t).into_text());
    let tx_hash = raw.tx_hash.as_deref().and_then(normalize_tx_hash);

    let (actor, amount) = decode_data(&raw.value, &kind);

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}-{}",
            tx_hash.as_deref().unwrap_or("none"),
            kind.as_str(),
            subject.as_deref().unwrap_or("none")
        )
    });

    Ok(MilestoneEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        source: source.as_str().to_string(),
        subject_kind: subject_kind.map(|k| k.as_str().to_string()),
        subject,
        actor,
        amount,
        payload: raw.value.to_string(),
        ledger,
        timestamp,
        contract_id,
        tx_hash,
    })
}

/// Pull `(actor, amount)` out of the JSON `value` blob, using the field names
/// of each event's payload struct.
fn decode_data(value: &Value, kind: &EventKind) -> (Option<String>, Option<String>) {
    match kind {
        EventKind::FundsDonated => (
            extract_field(value, &["donor"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::GoalReached => (None, extract_field(value, &["funds_raised"])),
        EventKind::GovernanceSet => (extract_field(value, &["authority"]), None),
        EventKind::StageReleased => (
            extract_field(value, &["beneficiary"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::RefundsEnabled => (None, extract_field(value, &["refund_pool"])),
        EventKind::RefundClaimed => (
            extract_field(value, &["contributor"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::ProjectCancelled | EventKind::ProjectFailed => {
            (None, extract_field(value, &["balance"]))
        }
        EventKind::Staked | EventKind::Unstaked => (
            extract_field(value, &["voter"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::ProposalCreated => (extract_field(value, &["proposer"]), None),
        EventKind::VoteCast => (
            extract_field(value, &["voter"]),
            extract_field(value, &["weight"]),
        ),
        EventKind::ProposalFinalized => (None, extract_field(value, &["votes_for"])),
        EventKind::FailureDeclared | EventKind::Unknown => (None, None),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let found = match value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// A decoded topic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValue {
    Symbol(String),
    Number(u64),
    /// Anything else, kept verbatim.
    Raw(String),
}

impl TopicValue {
    pub fn into_text(self) -> String {
        match self {
            Self::Symbol(s) | Self::Raw(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Decode one topic entry. Plain strings that are neither JSON nor XDR are
/// taken as symbols.
pub fn decode_topic(raw: &str) -> TopicValue {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        match v.get("value") {
            Some(Value::Number(n)) => {
                if let Some(n) = n.as_u64() {
                    return TopicValue::Number(n);
                }
            }
            Some(Value::String(s)) => {
                let is_symbol = v.get("type").and_then(Value::as_str) == Some("symbol");
                if !is_symbol {
                    if let Ok(n) = s.parse::<u64>() {
                        return TopicValue::Number(n);
                    }
                }
                return TopicValue::Symbol(s.clone());
            }
            _ => {}
        }
        return TopicValue::Raw(raw.to_string());
    }
    decode_scval(raw).unwrap_or_else(|| TopicValue::Symbol(raw.to_string()))
}

/// Decode a base64 XDR `ScVal` holding a symbol, `u32` or `u64`.
fn decode_scval(raw: &str) -> Option<TopicValue> {
    let bytes = STANDARD.decode(raw.trim()).ok()?;
    let (tag, body) = split_u32(&bytes)?;
    match tag {
        SCV_U32 => split_u32(body).map(|(n, _)| TopicValue::Number(n as u64)),
        SCV_U64 => {
            let word: [u8; 8] = body.get(..8)?.try_into().ok()?;
            Some(TopicValue::Number(u64::from_be_bytes(word)))
        }
        SCV_SYMBOL => {
            let (len, rest) = split_u32(body)?;
            let text = rest.get(..len as usize)?;
            String::from_utf8(text.to_vec()).ok().map(TopicValue::Symbol)
        }
        _ => None,
    }
}

fn split_u32(bytes: &[u8]) -> Option<(u32, &[u8])> {
    let word: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some((u32::from_be_bytes(word), &bytes[4..]))
}

/// Canonical lowercase hex form of a transaction hash. Accepts hex with or
/// without `0x` and base64 of the 32 raw hash bytes.
pub fn normalize_tx_hash(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if let Ok(bytes) = hex::decode(digits) {
        return Some(hex::encode(bytes));
    }
    if let Ok(bytes) = STANDARD.decode(trimmed) {
        if bytes.len() == 32 {
            return Some(hex::encode(bytes));
        }
    }
    Some(trimmed.to_ascii_lowercase())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
