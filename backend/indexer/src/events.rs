//! Event kinds published by the milestone escrow and governance contracts.
//!
//! Topic names mirror `contracts/milestone_escrow/src/events.rs` and
//! `contracts/milestone_governance/src/events.rs`.

use serde::{Deserialize, Serialize};

/// Which watched contract emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Escrow,
    Governance,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escrow => "escrow",
            Self::Governance => "governance",
        }
    }
}

/// What the second topic of an event identifies, if it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Proposal,
    Stage,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::Stage => "stage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `donated`
    FundsDonated,
    /// `goal_met`
    GoalReached,
    /// `gov_set`
    GovernanceSet,
    /// `released`, stage index
    StageReleased,
    /// `refunds`
    RefundsEnabled,
    /// `refunded`
    RefundClaimed,
    /// `cancelled`
    ProjectCancelled,
    /// `failed`
    ProjectFailed,
    /// `staked`
    Staked,
    /// `unstaked`
    Unstaked,
    /// `proposed`, proposal id
    ProposalCreated,
    /// `voted`, proposal id
    VoteCast,
    /// `finalized`, proposal id
    ProposalFinalized,
    /// `fail_decl`, stage index
    FailureDeclared,
    /// An event from a watched contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Map `(source, leading topic)` to a kind. The same symbol from the
    /// other contract is not recognised.
    pub fn from_topic(source: EventSource, topic: &str) -> Self {
        match (source, topic) {
            (EventSource::Escrow, "donated") => Self::FundsDonated,
            (EventSource::Escrow, "goal_met") => Self::GoalReached,
            (EventSource::Escrow, "gov_set") => Self::GovernanceSet,
            (EventSource::Escrow, "released") => Self::StageReleased,
            (EventSource::Escrow, "refunds") => Self::RefundsEnabled,
            (EventSource::Escrow, "refunded") => Self::RefundClaimed,
            (EventSource::Escrow, "cancelled") => Self::ProjectCancelled,
            (EventSource::Escrow, "failed") => Self::ProjectFailed,
            (EventSource::Governance, "staked") => Self::Staked,
            (EventSource::Governance, "unstaked") => Self::Unstaked,
            (EventSource::Governance, "proposed") => Self::ProposalCreated,
            (EventSource::Governance, "voted") => Self::VoteCast,
            (EventSource::Governance, "finalized") => Self::ProposalFinalized,
            (EventSource::Governance, "fail_decl") => Self::FailureDeclared,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FundsDonated => "funds_donated",
            Self::GoalReached => "goal_reached",
            Self::GovernanceSet => "governance_set",
            Self::StageReleased => "stage_released",
            Self::RefundsEnabled => "refunds_enabled",
            Self::RefundClaimed => "refund_claimed",
            Self::ProjectCancelled => "project_cancelled",
            Self::ProjectFailed => "project_failed",
            Self::Staked => "staked",
            Self::Unstaked => "unstaked",
            Self::ProposalCreated => "proposal_created",
            Self::VoteCast => "vote_cast",
            Self::ProposalFinalized => "proposal_finalized",
            Self::FailureDeclared => "failure_declared",
            Self::Unknown => "unknown",
        }
    }

    /// Meaning of the second topic, for kinds that publish one.
    pub fn subject_kind(&self) -> Option<SubjectKind> {
        match self {
            Self::ProposalCreated | Self::VoteCast | Self::ProposalFinalized => {
                Some(SubjectKind::Proposal)
            }
            Self::StageReleased | Self::FailureDeclared => Some(SubjectKind::Stage),
            _ => None,
        }
    }
}

/// A fully decoded contract event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneEvent {
    /// RPC event id, or a synthetic key when the RPC omitted it.
    pub event_id: String,
    pub event_type: String,
    pub source: String,
    pub subject_kind: Option<String>,
    pub subject: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Event data as returned by the RPC, serialised to JSON text.
    pub payload: String,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub source: String,
    pub subject_kind: Option<String>,
    pub subject: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub payload: String,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
