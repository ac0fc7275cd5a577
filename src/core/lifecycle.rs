//! Status enums and transition tables for every request kind.
//!
//! Build requests move through a delivery pipeline; support tickets and
//! intelligence requests share the ticket lifecycle. Each table is an
//! exhaustive match, so adding a status without wiring its edges fails to
//! compile instead of silently falling back to a default.

use crate::core::error::ReqtrackError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Build,
    Support,
    Intelligence,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [
        RequestKind::Build,
        RequestKind::Support,
        RequestKind::Intelligence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Build => "build",
            RequestKind::Support => "support",
            RequestKind::Intelligence => "intelligence",
        }
    }

    /// Prefix used for generated ids, e.g. `BLD-2026-001`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RequestKind::Build => "BLD",
            RequestKind::Support => "SUP",
            RequestKind::Intelligence => "DIR",
        }
    }

    pub fn initial_status(&self) -> Status {
        match self {
            RequestKind::Build => Status::Build(BuildStatus::Intake),
            RequestKind::Support | RequestKind::Intelligence => Status::Ticket(TicketStatus::New),
        }
    }

    /// Every member of this kind's status enum, in pipeline order.
    pub fn statuses(&self) -> Vec<Status> {
        match self {
            RequestKind::Build => BuildStatus::ALL.iter().copied().map(Status::Build).collect(),
            RequestKind::Support | RequestKind::Intelligence => {
                TicketStatus::ALL.iter().copied().map(Status::Ticket).collect()
            }
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildStatus {
    Intake,
    Triage,
    Queue,
    InProgress,
    Testing,
    Deployed,
    Closed,
}

impl BuildStatus {
    pub const ALL: [BuildStatus; 7] = [
        BuildStatus::Intake,
        BuildStatus::Triage,
        BuildStatus::Queue,
        BuildStatus::InProgress,
        BuildStatus::Testing,
        BuildStatus::Deployed,
        BuildStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Intake => "intake",
            BuildStatus::Triage => "triage",
            BuildStatus::Queue => "queue",
            BuildStatus::InProgress => "in-progress",
            BuildStatus::Testing => "testing",
            BuildStatus::Deployed => "deployed",
            BuildStatus::Closed => "closed",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        BuildStatus::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    /// `closed` is the manual override reachable from every active state.
    pub fn next(&self) -> &'static [BuildStatus] {
        match self {
            BuildStatus::Intake => &[BuildStatus::Triage, BuildStatus::Closed],
            BuildStatus::Triage => &[BuildStatus::Queue, BuildStatus::Closed],
            BuildStatus::Queue => &[BuildStatus::InProgress, BuildStatus::Closed],
            BuildStatus::InProgress => &[BuildStatus::Testing, BuildStatus::Closed],
            BuildStatus::Testing => &[BuildStatus::Deployed, BuildStatus::Closed],
            BuildStatus::Deployed | BuildStatus::Closed => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketStatus {
    New,
    Assigned,
    InProgress,
    PendingReview,
    Completed,
    OnHold,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 7] = [
        TicketStatus::New,
        TicketStatus::Assigned,
        TicketStatus::InProgress,
        TicketStatus::PendingReview,
        TicketStatus::Completed,
        TicketStatus::OnHold,
        TicketStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Assigned => "assigned",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::PendingReview => "pending-review",
            TicketStatus::Completed => "completed",
            TicketStatus::OnHold => "on-hold",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        TicketStatus::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    /// `on-hold` and `cancelled` are side branches and both terminal.
    pub fn next(&self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::New => &[
                TicketStatus::Assigned,
                TicketStatus::OnHold,
                TicketStatus::Cancelled,
            ],
            TicketStatus::Assigned => &[
                TicketStatus::InProgress,
                TicketStatus::OnHold,
                TicketStatus::Cancelled,
            ],
            TicketStatus::InProgress => &[
                TicketStatus::PendingReview,
                TicketStatus::OnHold,
                TicketStatus::Cancelled,
            ],
            TicketStatus::PendingReview => &[
                TicketStatus::Completed,
                TicketStatus::InProgress,
                TicketStatus::Cancelled,
            ],
            TicketStatus::Completed | TicketStatus::OnHold | TicketStatus::Cancelled => &[],
        }
    }
}

/// A lifecycle status, tagged by the status family it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Build(BuildStatus),
    Ticket(TicketStatus),
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Build(s) => s.as_str(),
            Status::Ticket(s) => s.as_str(),
        }
    }

    /// Parse a kebab-case status name against the enum of `kind`.
    pub fn parse(kind: RequestKind, name: &str) -> Result<Status, ReqtrackError> {
        let name = name.trim();
        let parsed = match kind {
            RequestKind::Build => BuildStatus::from_name(name).map(Status::Build),
            RequestKind::Support | RequestKind::Intelligence => {
                TicketStatus::from_name(name).map(Status::Ticket)
            }
        };
        parsed.ok_or_else(|| {
            ReqtrackError::InvalidState(format!(
                "'{}' is not a {} status (expected one of: {})",
                name,
                kind,
                kind.statuses()
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    pub fn belongs_to(&self, kind: RequestKind) -> bool {
        matches!(
            (kind, self),
            (RequestKind::Build, Status::Build(_))
                | (RequestKind::Support, Status::Ticket(_))
                | (RequestKind::Intelligence, Status::Ticket(_))
        )
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Status::Build(s) => s.next().is_empty(),
            Status::Ticket(s) => s.next().is_empty(),
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(
            self,
            Status::Build(BuildStatus::Intake) | Status::Ticket(TicketStatus::New)
        )
    }

    /// Work that has been picked up and not yet finished.
    pub fn is_active(&self) -> bool {
        !self.is_initial() && !self.is_terminal()
    }

    /// Terminal states that count as delivered rather than abandoned.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Status::Build(BuildStatus::Deployed) | Status::Ticket(TicketStatus::Completed)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn ensure_member(kind: RequestKind, status: Status) -> Result<(), ReqtrackError> {
    if status.belongs_to(kind) {
        Ok(())
    } else {
        Err(ReqtrackError::InvalidState(format!(
            "status '{}' is not a member of the {} lifecycle",
            status, kind
        )))
    }
}

/// Ordered legal next statuses. Terminal states yield an empty list.
pub fn next_statuses(kind: RequestKind, status: Status) -> Result<Vec<Status>, ReqtrackError> {
    ensure_member(kind, status)?;
    Ok(match status {
        Status::Build(s) => s.next().iter().copied().map(Status::Build).collect(),
        Status::Ticket(s) => s.next().iter().copied().map(Status::Ticket).collect(),
    })
}

pub fn can_transition(
    kind: RequestKind,
    from: Status,
    to: Status,
) -> Result<bool, ReqtrackError> {
    Ok(next_statuses(kind, from)?.contains(&to))
}
