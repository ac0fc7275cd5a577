//! Derived view model: pure summaries over a request snapshot.
//!
//! Nothing here mutates a request. SLA classes are recomputed against the
//! `now` the caller passes in, so the same snapshot can be re-read as time
//! moves on. Ratios and averages over an empty input are 0, never NaN.

use crate::core::lifecycle::{RequestKind, Status};
use crate::core::request::{ActivityAction, Priority, Request};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of requests per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub counts: BTreeMap<Status, usize>,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn percentages(&self) -> BTreeMap<Status, f64> {
        percentage_shares(&self.counts)
    }
}

/// `part / total` as a percentage; 0 when `total` is 0.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Each key's share of the total. Shares sum to 100 (within floating point
/// rounding) when the total is non-zero, and are all 0 otherwise.
pub fn percentage_shares<K: Ord + Copy>(counts: &BTreeMap<K, usize>) -> BTreeMap<K, f64> {
    let total: usize = counts.values().sum();
    counts
        .iter()
        .map(|(k, &n)| (*k, percent(n, total)))
        .collect()
}

/// Status breakdown restricted to requests matching `filter`.
///
/// With a `kind`, only that kind is counted and every member of its status
/// enum appears in the result, zero counts included.
pub fn status_counts_where<F>(
    requests: &[Request],
    kind: Option<RequestKind>,
    filter: F,
) -> StatusCounts
where
    F: Fn(&Request) -> bool,
{
    let mut counts = BTreeMap::new();
    if let Some(k) = kind {
        for status in k.statuses() {
            counts.insert(status, 0);
        }
    }
    for request in requests {
        if kind.is_some_and(|k| request.kind != k) || !filter(request) {
            continue;
        }
        *counts.entry(request.status).or_insert(0) += 1;
    }
    StatusCounts { counts }
}

pub fn status_counts(requests: &[Request], kind: Option<RequestKind>) -> StatusCounts {
    status_counts_where(requests, kind, |_| true)
}

/// Every priority appears, zero counts included.
pub fn priority_counts(requests: &[Request]) -> BTreeMap<Priority, usize> {
    let mut counts: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for request in requests {
        *counts.entry(request.priority).or_insert(0) += 1;
    }
    counts
}

/// Requests picked up and not yet finished.
pub fn active_count(requests: &[Request]) -> usize {
    requests.iter().filter(|r| r.status.is_active()).count()
}

/// Share of requests that reached a completion state, as a percentage.
pub fn completion_rate(requests: &[Request]) -> f64 {
    let completed = requests
        .iter()
        .filter(|r| r.status.is_completion())
        .count();
    percent(completed, requests.len())
}

/// Mean hours from submission to completion over completed requests.
pub fn average_resolution_hours(requests: &[Request]) -> f64 {
    let durations: Vec<f64> = requests
        .iter()
        .filter_map(|r| r.completed_at.map(|done| done - r.created_at))
        .map(|d| d.num_minutes() as f64 / 60.0)
        .collect();
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlaStatus {
    Breached,
    AtRisk,
    OnTrack,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::Breached => "breached",
            SlaStatus::AtRisk => "at-risk",
            SlaStatus::OnTrack => "on-track",
        }
    }
}

/// Due-date health relative to `now`.
///
/// Terminal requests and requests without a due date are on-track.
pub fn classify_sla(request: &Request, now: DateTime<Utc>, at_risk_window: Duration) -> SlaStatus {
    if request.status.is_terminal() {
        return SlaStatus::OnTrack;
    }
    match request.due_date {
        None => SlaStatus::OnTrack,
        Some(due) if due < now => SlaStatus::Breached,
        Some(due) if due - now <= at_risk_window => SlaStatus::AtRisk,
        Some(_) => SlaStatus::OnTrack,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlaSummary {
    pub breached: usize,
    pub at_risk: usize,
    pub on_track: usize,
}

impl SlaSummary {
    pub fn total(&self) -> usize {
        self.breached + self.at_risk + self.on_track
    }
}

pub fn sla_summary(requests: &[Request], now: DateTime<Utc>, at_risk_window: Duration) -> SlaSummary {
    let mut summary = SlaSummary::default();
    for request in requests {
        match classify_sla(request, now, at_risk_window) {
            SlaStatus::Breached => summary.breached += 1,
            SlaStatus::AtRisk => summary.at_risk += 1,
            SlaStatus::OnTrack => summary.on_track += 1,
        }
    }
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedEvent {
    Submitted,
    Completed,
    Activity(ActivityAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub request_id: String,
    pub title: String,
    pub event: FeedEvent,
    pub actor: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Submissions, completions and activity entries of every request merged
/// into one sequence, most recent first, capped at `limit`.
pub fn activity_feed(requests: &[Request], limit: usize) -> Vec<FeedItem> {
    let mut items = Vec::new();
    for request in requests {
        items.push(FeedItem {
            request_id: request.id.clone(),
            title: request.title.clone(),
            event: FeedEvent::Submitted,
            actor: request.requester.clone(),
            detail: format!("{} request submitted", request.kind),
            timestamp: request.created_at,
        });
        if let Some(done) = request.completed_at {
            items.push(FeedItem {
                request_id: request.id.clone(),
                title: request.title.clone(),
                event: FeedEvent::Completed,
                actor: request.assigned_to.clone().unwrap_or_default(),
                detail: format!("reached {}", request.status),
                timestamp: done,
            });
        }
        for entry in &request.activity_log {
            items.push(FeedItem {
                request_id: request.id.clone(),
                title: request.title.clone(),
                event: FeedEvent::Activity(entry.action),
                actor: entry.actor.clone(),
                detail: entry.detail.clone(),
                timestamp: entry.timestamp,
            });
        }
    }
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(limit);
    items
}

/// Everything the summary report shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub kind: Option<RequestKind>,
    pub total: usize,
    pub active: usize,
    pub by_status: StatusCounts,
    pub status_share: BTreeMap<Status, f64>,
    pub by_priority: BTreeMap<Priority, usize>,
    pub sla: SlaSummary,
    pub completion_rate: f64,
    pub average_resolution_hours: f64,
}

pub fn summarize(
    requests: &[Request],
    kind: Option<RequestKind>,
    now: DateTime<Utc>,
    at_risk_window: Duration,
) -> Summary {
    let scoped: Vec<Request> = requests
        .iter()
        .filter(|r| kind.is_none_or(|k| r.kind == k))
        .cloned()
        .collect();
    let by_status = status_counts(&scoped, kind);
    Summary {
        kind,
        total: scoped.len(),
        active: active_count(&scoped),
        status_share: by_status.percentages(),
        by_status,
        by_priority: priority_counts(&scoped),
        sla: sla_summary(&scoped, now, at_risk_window),
        completion_rate: completion_rate(&scoped),
        average_resolution_hours: average_resolution_hours(&scoped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_guards_zero_total() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_percentage_shares_empty_map() {
        let counts: BTreeMap<Priority, usize> = BTreeMap::new();
        assert!(percentage_shares(&counts).is_empty());
    }

    #[test]
    fn test_empty_inputs_default_to_zero() {
        assert_eq!(completion_rate(&[]), 0.0);
        assert_eq!(average_resolution_hours(&[]), 0.0);
        assert_eq!(active_count(&[]), 0);
        assert!(activity_feed(&[], 7).is_empty());
        let counts = status_counts(&[], Some(RequestKind::Build));
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.counts.len(), 7);
        assert!(counts.percentages().values().all(|p| *p == 0.0));
    }

    #[test]
    fn test_sla_status_names() {
        assert_eq!(SlaStatus::AtRisk.as_str(), "at-risk");
        assert_eq!(
            serde_json::to_string(&SlaStatus::OnTrack).unwrap(),
            "\"on-track\""
        );
    }
}
