//! The request store: owner of the canonical request collection.
//!
//! Every read and write of request state goes through [`Store`]. Mutations
//! take `&mut self`, so a single writer is enforced by the borrow checker and
//! readers holding `&Store` or `&[Request]` never observe a partial update.
//! A rejected mutation returns an error and leaves the request untouched.

use crate::core::config::TrackerConfig;
use crate::core::error::ReqtrackError;
use crate::core::lifecycle::{self, Status};
use crate::core::request::{ActivityAction, ActivityEntry, Actor, NewRequest, Request};
use crate::core::time;
use chrono::{DateTime, Datelike, Utc};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Store {
    /// Insertion order, oldest first. Display order is the reverse.
    requests: Vec<Request>,
    index: FxHashMap<String, usize>,
    actors: FxHashMap<String, Actor>,
    operator: String,
}

impl Store {
    pub fn new(operator: &str, actors: Vec<Actor>) -> Self {
        Self {
            requests: Vec::new(),
            index: FxHashMap::default(),
            actors: actors.into_iter().map(|a| (a.id.clone(), a)).collect(),
            operator: operator.to_string(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(&config.operator, config.actors.clone())
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter().rev()
    }

    /// Unordered snapshot for aggregation.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn actor(&self, actor_id: &str) -> Option<&Actor> {
        self.actors.get(actor_id)
    }

    /// Bulk load seed records given in display order (newest first).
    /// Seed data is trusted and not validated.
    pub fn insert_seed(&mut self, seed: Vec<Request>) {
        for request in seed.into_iter().rev() {
            if self.index.contains_key(&request.id) {
                tracing::warn!(request_id = %request.id, "skipping duplicate seed request");
                continue;
            }
            self.push(request);
        }
    }

    fn push(&mut self, request: Request) {
        self.index.insert(request.id.clone(), self.requests.len());
        self.requests.push(request);
    }

    fn next_id(&self, data: &NewRequest, now: &DateTime<Utc>) -> String {
        let prefix = format!("{}-{}-", data.kind.id_prefix(), now.year());
        let mut seq = self
            .index
            .keys()
            .filter(|id| id.starts_with(&prefix))
            .count()
            + 1;
        loop {
            let candidate = format!("{}{:03}", prefix, seq);
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
            seq += 1;
        }
    }

    pub fn create(&mut self, data: NewRequest) -> Result<&Request, ReqtrackError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(ReqtrackError::ValidationError(
                "request title cannot be empty".to_string(),
            ));
        }

        let now = time::now();
        let id = self.next_id(&data, &now);
        let request = Request {
            id: id.clone(),
            kind: data.kind,
            title: title.to_string(),
            requester: data.requester.clone(),
            scope: data.scope.clone(),
            status: data.kind.initial_status(),
            priority: data.priority,
            assigned_to: None,
            assigned_team: None,
            created_at: now,
            updated_at: now,
            due_date: data.due_date,
            completed_at: None,
            activity_log: Vec::new(),
            notes: Vec::new(),
        };
        tracing::debug!(request_id = %id, kind = %data.kind, "request created");
        self.push(request);
        self.find_by_id(&id)
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Request, ReqtrackError> {
        self.index
            .get(id)
            .map(|&pos| &self.requests[pos])
            .ok_or_else(|| ReqtrackError::NotFound(format!("request '{}'", id)))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Request, ReqtrackError> {
        match self.index.get(id) {
            Some(&pos) => Ok(&mut self.requests[pos]),
            None => {
                tracing::warn!(request_id = %id, "mutation on unknown request");
                Err(ReqtrackError::NotFound(format!("request '{}'", id)))
            }
        }
    }

    /// Allowed next statuses for the request's current status.
    pub fn next_statuses(&self, id: &str) -> Result<Vec<Status>, ReqtrackError> {
        let request = self.find_by_id(id)?;
        lifecycle::next_statuses(request.kind, request.status)
    }

    /// Re-assigning an assigned request overwrites the owner and logs again.
    pub fn assign(&mut self, id: &str, actor_id: &str) -> Result<&Request, ReqtrackError> {
        let actor = self
            .actor(actor_id)
            .cloned()
            .ok_or_else(|| ReqtrackError::NotFound(format!("actor '{}'", actor_id)))?;
        let operator = self.operator.clone();
        let request = self.find_mut(id)?;

        let now = time::now();
        request.assigned_to = Some(actor.name.clone());
        request.assigned_team = Some(actor.team.clone());
        request.updated_at = now;
        request.activity_log.push(ActivityEntry {
            id: time::new_event_id(),
            actor: operator,
            action: ActivityAction::Assigned,
            detail: format!("{} ({})", actor.name, actor.team),
            timestamp: now,
        });
        tracing::debug!(request_id = %id, actor_id = %actor.id, "request assigned");
        self.find_by_id(id)
    }

    /// No-op on a request that is not assigned: nothing changes, nothing is logged.
    pub fn unassign(&mut self, id: &str) -> Result<&Request, ReqtrackError> {
        let operator = self.operator.clone();
        let request = self.find_mut(id)?;
        if !request.is_assigned() {
            tracing::debug!(request_id = %id, "unassign on unassigned request ignored");
            return self.find_by_id(id);
        }

        let previous = request
            .assigned_to
            .take()
            .or_else(|| request.assigned_team.clone())
            .unwrap_or_default();
        request.assigned_team = None;
        let now = time::now();
        request.updated_at = now;
        request.activity_log.push(ActivityEntry {
            id: time::new_event_id(),
            actor: operator,
            action: ActivityAction::Unassigned,
            detail: previous,
            timestamp: now,
        });
        tracing::debug!(request_id = %id, "request unassigned");
        self.find_by_id(id)
    }

    pub fn transition_status(&mut self, id: &str, next: Status) -> Result<&Request, ReqtrackError> {
        let operator = self.operator.clone();
        let request = self.find_mut(id)?;
        let from = request.status;
        let allowed = lifecycle::next_statuses(request.kind, from)?;
        if !allowed.contains(&next) {
            tracing::warn!(request_id = %id, from = %from, to = %next, "illegal transition rejected");
            return Err(ReqtrackError::IllegalTransition {
                id: id.to_string(),
                from: from.to_string(),
                to: next.to_string(),
            });
        }

        let now = time::now();
        request.status = next;
        request.updated_at = now;
        if next.is_completion() {
            request.completed_at = Some(now);
        }
        request.activity_log.push(ActivityEntry {
            id: time::new_event_id(),
            actor: operator,
            action: ActivityAction::StatusChanged,
            detail: format!("{} -> {}", from, next),
            timestamp: now,
        });
        tracing::debug!(request_id = %id, from = %from, to = %next, "status transition");
        self.find_by_id(id)
    }

    /// Notes are tracked apart from the activity log and add no entry to it.
    pub fn append_note(&mut self, id: &str, text: &str) -> Result<&Request, ReqtrackError> {
        if text.trim().is_empty() {
            return Err(ReqtrackError::ValidationError(
                "note text cannot be empty".to_string(),
            ));
        }
        let request = self.find_mut(id)?;
        request.notes.push(text.to_string());
        request.updated_at = time::now();
        self.find_by_id(id)
    }

    /// Collaborator edit of the due date; `None` clears it.
    pub fn set_due_date(
        &mut self,
        id: &str,
        due: Option<DateTime<Utc>>,
    ) -> Result<&Request, ReqtrackError> {
        let request = self.find_mut(id)?;
        request.due_date = due;
        request.updated_at = time::now();
        self.find_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lifecycle::{BuildStatus, RequestKind, TicketStatus};
    use crate::core::request::Priority;

    fn roster() -> Vec<Actor> {
        vec![Actor {
            id: "u-1".to_string(),
            name: "Dana Reyes".to_string(),
            team: "Platform Engineering".to_string(),
        }]
    }

    #[test]
    fn test_ids_are_sequential_per_kind() {
        let mut store = Store::new("ops", roster());
        let a = store
            .create(NewRequest::new(RequestKind::Build, "first"))
            .unwrap()
            .id
            .clone();
        let b = store
            .create(NewRequest::new(RequestKind::Build, "second"))
            .unwrap()
            .id
            .clone();
        let c = store
            .create(NewRequest::new(RequestKind::Support, "ticket"))
            .unwrap()
            .id
            .clone();
        assert!(a.starts_with("BLD-") && a.ends_with("-001"));
        assert!(b.ends_with("-002"));
        assert!(c.starts_with("SUP-") && c.ends_with("-001"));
    }

    #[test]
    fn test_iter_is_newest_first() {
        let mut store = Store::new("ops", roster());
        store
            .create(NewRequest::new(RequestKind::Build, "older"))
            .unwrap();
        store
            .create(NewRequest::new(RequestKind::Build, "newer"))
            .unwrap();
        let titles: Vec<_> = store.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = Store::new("ops", roster());
        let err = store.create(NewRequest::new(RequestKind::Intelligence, "   "));
        assert!(matches!(err, Err(ReqtrackError::ValidationError(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_completion_stamps_completed_at() {
        let mut store = Store::new("ops", roster());
        let id = store
            .create(NewRequest::new(RequestKind::Support, "vpn").with_priority(Priority::High))
            .unwrap()
            .id
            .clone();
        for next in [
            TicketStatus::Assigned,
            TicketStatus::InProgress,
            TicketStatus::PendingReview,
        ] {
            store.transition_status(&id, Status::Ticket(next)).unwrap();
            assert!(store.find_by_id(&id).unwrap().completed_at.is_none());
        }
        let done = store
            .transition_status(&id, Status::Ticket(TicketStatus::Completed))
            .unwrap();
        assert!(done.completed_at.is_some());
        assert_eq!(done.activity_log.len(), 4);
    }

    #[test]
    fn test_closing_does_not_stamp_completed_at() {
        let mut store = Store::new("ops", roster());
        let id = store
            .create(NewRequest::new(RequestKind::Build, "abandon"))
            .unwrap()
            .id
            .clone();
        let closed = store
            .transition_status(&id, Status::Build(BuildStatus::Closed))
            .unwrap();
        assert!(closed.completed_at.is_none());
        assert!(closed.status.is_terminal());
    }

    #[test]
    fn test_assign_unknown_actor_leaves_request_untouched() {
        let mut store = Store::new("ops", roster());
        let id = store
            .create(NewRequest::new(RequestKind::Build, "x"))
            .unwrap()
            .id
            .clone();
        assert!(store.actor("nobody").is_none());
        assert_eq!(store.actor("u-1").map(|a| a.team.as_str()), Some("Platform Engineering"));
        let err = store.assign(&id, "nobody");
        assert!(matches!(err, Err(ReqtrackError::NotFound(_))));
        let request = store.find_by_id(&id).unwrap();
        assert!(!request.is_assigned());
        assert!(request.activity_log.is_empty());
    }
}
