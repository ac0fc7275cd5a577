//! reqtrack: request lifecycle tracking for build, support and intelligence work.
//!
//! Every request moves through a closed set of statuses for its kind. Legal
//! moves are declared once, in [`core::lifecycle`], and the [`core::store::Store`]
//! refuses anything else. Views over the collection (status breakdowns, SLA
//! health, the activity feed) are pure functions in [`core::metrics`].
//!
//! # Lifecycles
//!
//! - **build**: `intake → triage → queue → in-progress → testing → deployed`,
//!   with `closed` reachable from every active state.
//! - **support / intelligence**: `new → assigned → in-progress → pending-review
//!   → completed`, with `on-hold` and `cancelled` as terminal side branches.
//!
//! # Examples
//!
//! ```bash
//! # Status and SLA breakdown of the embedded sample
//! reqtrack summary
//!
//! # Which moves are legal from triage?
//! reqtrack next --kind build --status triage
//!
//! # Apply a mutation script and print the outcome as JSON
//! reqtrack --format json replay --script ops.jsonl
//! ```
//!
//! State lives in memory only; nothing is written back to disk.

pub(crate) mod cli;
pub mod core;

use crate::cli::{Cli, Command, OutputFormat};
use crate::core::config::{self, TrackerConfig};
use crate::core::error::ReqtrackError;
use crate::core::lifecycle::{self, Status};
use crate::core::metrics::{self, SlaStatus};
use crate::core::request::Request;
use crate::core::store::Store;
use crate::core::{output, replay, seed, time};

use clap::Parser;
use serde_json::Value as JsonValue;
use std::path::Path;

fn load_store(
    config_path: Option<&Path>,
    seed_path: Option<&Path>,
) -> Result<(TrackerConfig, Store), ReqtrackError> {
    let config = match config_path {
        Some(path) => config::load_config(path)?,
        None => config::load_config(&std::env::current_dir()?)?,
    };
    let requests = match seed_path {
        Some(path) => seed::load_seed(path)?,
        None => seed::sample_seed()?,
    };
    let mut store = Store::from_config(&config);
    store.insert_seed(requests);
    tracing::debug!(requests = store.len(), operator = store.operator(), "store ready");
    Ok((config, store))
}

fn emit(format: OutputFormat, envelope: JsonValue, text: String) -> Result<(), ReqtrackError> {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&envelope)
                .map_err(|e| ReqtrackError::ValidationError(e.to_string()))?;
            println!("{}", rendered);
        }
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue, ReqtrackError> {
    serde_json::to_value(value).map_err(|e| ReqtrackError::ValidationError(e.to_string()))
}

pub fn run() -> Result<(), ReqtrackError> {
    let cli = Cli::parse();
    let (config, mut store) = load_store(cli.config.as_deref(), cli.seed.as_deref())?;
    let now = time::now();
    let window = config.sla.at_risk_window();

    match cli.command {
        Command::List {
            kind,
            status,
            priority,
        } => {
            let status = match (kind, status) {
                (Some(k), Some(s)) => Some(Status::parse(k, &s)?),
                _ => None,
            };
            let items: Vec<&Request> = store
                .iter()
                .filter(|r| kind.is_none_or(|k| r.kind == k))
                .filter(|r| status.is_none_or(|s| r.status == s))
                .filter(|r| priority.is_none_or(|p| r.priority == p))
                .collect();
            let text = if items.is_empty() {
                "No requests found.".to_string()
            } else {
                items
                    .iter()
                    .map(|r| output::request_line(r))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let envelope = time::command_envelope(
                "list",
                "ok",
                serde_json::json!({ "items": to_json(&items)? }),
            );
            emit(cli.format, envelope, text)
        }
        Command::Show { id } => {
            let request = store.find_by_id(&id)?;
            let next = lifecycle::next_statuses(request.kind, request.status)?;
            let sla = metrics::classify_sla(request, now, window);
            let envelope = time::command_envelope(
                "show",
                "ok",
                serde_json::json!({
                    "item": to_json(request)?,
                    "next": to_json(&next)?,
                    "sla": sla,
                }),
            );
            emit(cli.format, envelope, output::request_detail(request, &next, sla))
        }
        Command::Next { kind, status } => {
            let current = Status::parse(kind, &status)?;
            let next = lifecycle::next_statuses(kind, current)?;
            let text = if next.is_empty() {
                format!("{} {} is terminal; no transitions available.", kind, current)
            } else {
                next.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let envelope = time::command_envelope(
                "next",
                "ok",
                serde_json::json!({
                    "kind": kind,
                    "status": current,
                    "next": to_json(&next)?,
                }),
            );
            emit(cli.format, envelope, text)
        }
        Command::Summary { kind, scope } => {
            let scoped: Vec<Request> = store
                .requests()
                .iter()
                .filter(|r| scope.as_deref().is_none_or(|s| r.scope == s))
                .cloned()
                .collect();
            let summary = metrics::summarize(&scoped, kind, now, window);
            let envelope = time::command_envelope(
                "summary",
                "ok",
                serde_json::json!({ "summary": to_json(&summary)? }),
            );
            emit(cli.format, envelope, output::summary_text(&summary))
        }
        Command::Sla { kind } => {
            let mut board: Vec<(SlaStatus, &Request)> = store
                .iter()
                .filter(|r| kind.is_none_or(|k| r.kind == k))
                .filter(|r| !r.status.is_terminal())
                .map(|r| (metrics::classify_sla(r, now, window), r))
                .collect();
            board.sort_by_key(|(sla, r)| (*sla, r.due_date));
            let text = if board.is_empty() {
                "No open requests.".to_string()
            } else {
                board
                    .iter()
                    .map(|(sla, r)| format!("{:<10} {}", output::sla_label(*sla), output::request_line(r)))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let rows: Vec<JsonValue> = board
                .iter()
                .map(|(sla, r)| {
                    serde_json::json!({
                        "id": r.id,
                        "sla": sla,
                        "due_date": r.due_date,
                        "status": r.status,
                    })
                })
                .collect();
            let envelope = time::command_envelope("sla", "ok", serde_json::json!({ "items": rows }));
            emit(cli.format, envelope, text)
        }
        Command::Feed { limit } => {
            let limit = limit.unwrap_or(config.feed.limit);
            let feed = metrics::activity_feed(store.requests(), limit);
            let text = if feed.is_empty() {
                "No activity.".to_string()
            } else {
                feed.iter()
                    .map(output::feed_line)
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let envelope =
                time::command_envelope("feed", "ok", serde_json::json!({ "items": to_json(&feed)? }));
            emit(cli.format, envelope, text)
        }
        Command::Replay { script } => {
            let report = replay::replay_file(&mut store, &script)?;
            let summary = metrics::summarize(store.requests(), None, now, window);
            let status = if report.failed == 0 { "ok" } else { "partial" };
            let envelope = time::command_envelope(
                "replay",
                status,
                serde_json::json!({
                    "report": to_json(&report)?,
                    "summary": to_json(&summary)?,
                }),
            );
            let text = format!(
                "{}\n\n{}",
                output::replay_text(&report),
                output::summary_text(&summary)
            );
            emit(cli.format, envelope, text)
        }
    }
}
