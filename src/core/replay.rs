//! Replay of JSON-lines mutation scripts against an in-memory store.
//!
//! One operation per line, tagged by `op`:
//!
//! ```text
//! {"op":"create","kind":"build","title":"Forecast service","priority":"high"}
//! {"op":"transition","id":"@last","to":"triage"}
//! {"op":"assign","id":"SUP-2026-003","actor":"u-100"}
//! {"op":"note","id":"SUP-2026-003","text":"Waiting on vendor patch"}
//! ```
//!
//! `@last` refers to the most recent request created by the same script.
//! A failed operation is recorded and the replay moves on; nothing is
//! written back to disk.

use crate::core::error::ReqtrackError;
use crate::core::lifecycle::{RequestKind, Status};
use crate::core::request::NewRequest;
use crate::core::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const LAST_CREATED: &str = "@last";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayOp {
    Create(NewRequest),
    Assign { id: String, actor: String },
    Unassign { id: String },
    Transition { id: String, to: String },
    Note { id: String, text: String },
    Due {
        id: String,
        #[serde(default)]
        due: Option<DateTime<Utc>>,
    },
}

impl ReplayOp {
    pub fn name(&self) -> &'static str {
        match self {
            ReplayOp::Create(_) => "create",
            ReplayOp::Assign { .. } => "assign",
            ReplayOp::Unassign { .. } => "unassign",
            ReplayOp::Transition { .. } => "transition",
            ReplayOp::Note { .. } => "note",
            ReplayOp::Due { .. } => "due",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub line: usize,
    pub op: String,
    pub id: Option<String>,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub failed: usize,
    pub outcomes: Vec<ReplayOutcome>,
}

/// Parse a script into `(line number, op)` pairs. Blank lines and `#`
/// comments are skipped; a malformed line fails the whole parse.
pub fn parse_script(content: &str) -> Result<Vec<(usize, ReplayOp)>, ReqtrackError> {
    let mut ops = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let op: ReplayOp = serde_json::from_str(line).map_err(|e| {
            ReqtrackError::ValidationError(format!("Invalid replay op on line {}: {}", idx + 1, e))
        })?;
        ops.push((idx + 1, op));
    }
    Ok(ops)
}

fn resolve_id(id: &str, last_created: &Option<String>) -> Result<String, ReqtrackError> {
    if id != LAST_CREATED {
        return Ok(id.to_string());
    }
    last_created.clone().ok_or_else(|| {
        ReqtrackError::ValidationError(format!("{} used before any create", LAST_CREATED))
    })
}

/// Apply one operation; returns the id of the request it touched.
pub fn apply_op(
    store: &mut Store,
    op: &ReplayOp,
    last_created: &mut Option<String>,
) -> Result<String, ReqtrackError> {
    match op {
        ReplayOp::Create(data) => {
            let id = store.create(data.clone())?.id.clone();
            *last_created = Some(id.clone());
            Ok(id)
        }
        ReplayOp::Assign { id, actor } => {
            let id = resolve_id(id, last_created)?;
            store.assign(&id, actor)?;
            Ok(id)
        }
        ReplayOp::Unassign { id } => {
            let id = resolve_id(id, last_created)?;
            store.unassign(&id)?;
            Ok(id)
        }
        ReplayOp::Transition { id, to } => {
            let id = resolve_id(id, last_created)?;
            let current = store.find_by_id(&id)?;
            let (kind, from) = (current.kind, current.status);
            let next = Status::parse(kind, to).map_err(|_| {
                // A status of another lifecycle is an illegal move, as in the store.
                if RequestKind::ALL.iter().any(|k| Status::parse(*k, to).is_ok()) {
                    ReqtrackError::IllegalTransition {
                        id: id.clone(),
                        from: from.to_string(),
                        to: to.trim().to_string(),
                    }
                } else {
                    ReqtrackError::ValidationError(format!("unknown status '{}'", to.trim()))
                }
            })?;
            store.transition_status(&id, next)?;
            Ok(id)
        }
        ReplayOp::Note { id, text } => {
            let id = resolve_id(id, last_created)?;
            store.append_note(&id, text)?;
            Ok(id)
        }
        ReplayOp::Due { id, due } => {
            let id = resolve_id(id, last_created)?;
            store.set_due_date(&id, *due)?;
            Ok(id)
        }
    }
}

pub fn replay(store: &mut Store, ops: &[(usize, ReplayOp)]) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut last_created = None;
    for (line, op) in ops {
        match apply_op(store, op, &mut last_created) {
            Ok(id) => {
                report.applied += 1;
                report.outcomes.push(ReplayOutcome {
                    line: *line,
                    op: op.name().to_string(),
                    id: Some(id),
                    ok: true,
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!(line = *line, op = op.name(), error = %e, "replay op failed");
                report.failed += 1;
                report.outcomes.push(ReplayOutcome {
                    line: *line,
                    op: op.name().to_string(),
                    id: None,
                    ok: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }
    report
}

pub fn replay_file(store: &mut Store, path: &Path) -> Result<ReplayReport, ReqtrackError> {
    let content = fs::read_to_string(path).map_err(ReqtrackError::IoError)?;
    let ops = parse_script(&content)?;
    Ok(replay(store, &ops))
}
