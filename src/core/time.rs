//! Shared timestamp/event helpers for activity entries and output envelopes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use ulid::Ulid;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 UTC with second precision (e.g. `2026-03-02T09:15:00Z`).
pub fn to_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_rfc3339() -> String {
    to_rfc3339(&now())
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// Standard command response envelope shape used across CLI surfaces.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "envelope_version": "1.0.0",
        "ts": now_rfc3339(),
        "event_id": new_event_id(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}
