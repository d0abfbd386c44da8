//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::Result;
use crate::events::{EventRecord, SubjectKind};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubjectEventsResponse {
    pub subject_kind: &'static str,
    pub subject: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /proposals/:id/events`
///
/// Creation, votes and finalisation of one governance proposal.
pub async fn get_proposal_events(
    State(state): State<Arc<ApiState>>,
    Path(proposal_id): Path<u64>,
) -> Response {
    subject_events(&state.pool, SubjectKind::Proposal, proposal_id.to_string()).await
}

/// `GET /stages/:index/events`
///
/// Release of one escrow stage and any failure declared on it.
pub async fn get_stage_events(
    State(state): State<Arc<ApiState>>,
    Path(stage_index): Path<u32>,
) -> Response {
    subject_events(&state.pool, SubjectKind::Stage, stage_index.to_string()).await
}

/// `GET /events`
///
/// Returns all indexed events from both contracts.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    respond(db::get_all_events(&state.pool).await.map(|events| AllEventsResponse {
        count: events.len(),
        events,
    }))
}

async fn subject_events(pool: &SqlitePool, kind: SubjectKind, subject: String) -> Response {
    let result = db::get_events_for_subject(pool, kind, &subject).await;
    respond(result.map(|events| SubjectEventsResponse {
        subject_kind: kind.as_str(),
        subject,
        count: events.len(),
        events,
    }))
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
