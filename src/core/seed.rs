//! Seed data: the initial request collection loaded into a store at startup.
//!
//! A sample collection is embedded at compile time so the tracker works with
//! no external files. Seed records are trusted; the only conversion that can
//! fail is resolving a status name against its request kind.

use crate::core::error::ReqtrackError;
use crate::core::lifecycle::{RequestKind, Status};
use crate::core::request::{ActivityEntry, Priority, Request};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const SAMPLE_SEED: &str = include_str!("../../assets/seed/requests.json");

/// Raw seed record; `status` stays a string until its kind is known.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub id: String,
    pub kind: RequestKind,
    pub title: String,
    #[serde(default)]
    pub requester: String,
    #[serde(default)]
    pub scope: String,
    pub status: String,
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_team: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl TryFrom<SeedRecord> for Request {
    type Error = ReqtrackError;

    fn try_from(rec: SeedRecord) -> Result<Self, Self::Error> {
        let status = Status::parse(rec.kind, &rec.status)
            .map_err(|e| ReqtrackError::InvalidState(format!("seed request {}: {}", rec.id, e)))?;
        Ok(Request {
            updated_at: rec.updated_at.unwrap_or(rec.created_at),
            id: rec.id,
            kind: rec.kind,
            title: rec.title,
            requester: rec.requester,
            scope: rec.scope,
            status,
            priority: rec.priority,
            assigned_to: rec.assigned_to,
            assigned_team: rec.assigned_team,
            created_at: rec.created_at,
            due_date: rec.due_date,
            completed_at: rec.completed_at,
            activity_log: rec.activity_log,
            notes: rec.notes,
        })
    }
}

/// Parse a JSON array of seed records, preserving their order.
pub fn parse_seed(json: &str) -> Result<Vec<Request>, ReqtrackError> {
    let records: Vec<SeedRecord> =
        serde_json::from_str(json).map_err(|e| ReqtrackError::SeedError(e.to_string()))?;
    records.into_iter().map(Request::try_from).collect()
}

pub fn load_seed(path: &Path) -> Result<Vec<Request>, ReqtrackError> {
    let content = fs::read_to_string(path).map_err(ReqtrackError::IoError)?;
    let requests = parse_seed(&content)?;
    tracing::debug!(path = %path.display(), count = requests.len(), "loaded seed");
    Ok(requests)
}

pub fn sample_seed() -> Result<Vec<Request>, ReqtrackError> {
    parse_seed(SAMPLE_SEED)
}
