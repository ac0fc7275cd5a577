//! Request records and the values they carry.

use crate::core::lifecycle::{RequestKind, Status};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person or service account that can own requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityAction {
    Assigned,
    Unassigned,
    StatusChanged,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Assigned => "assigned",
            ActivityAction::Unassigned => "unassigned",
            ActivityAction::StatusChanged => "status-changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub actor: String,
    pub action: ActivityAction,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: String,
    pub kind: RequestKind,
    pub title: String,
    pub requester: String,
    pub scope: String,
    pub status: Status,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub assigned_team: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub activity_log: Vec<ActivityEntry>,
    pub notes: Vec<String>,
}

impl Request {
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some() || self.assigned_team.is_some()
    }
}

/// Submission payload accepted by [`crate::core::store::Store::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub kind: RequestKind,
    pub title: String,
    #[serde(default)]
    pub requester: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl NewRequest {
    pub fn new(kind: RequestKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            requester: String::new(),
            scope: String::new(),
            priority: default_priority(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    pub fn with_requester(mut self, requester: &str) -> Self {
        self.requester = requester.to_string();
        self
    }
}
