use chrono::{DateTime, Duration, TimeZone, Utc};
use reqtrack::core::config::SlaConfig;
use reqtrack::core::lifecycle::{BuildStatus, RequestKind, Status, TicketStatus};
use reqtrack::core::metrics::{
    FeedEvent, SlaStatus, active_count, activity_feed, average_resolution_hours, classify_sla,
    completion_rate, percentage_shares, priority_counts, sla_summary, status_counts,
    status_counts_where, summarize,
};
use reqtrack::core::request::{ActivityAction, ActivityEntry, Priority, Request};
use reqtrack::core::seed::sample_seed;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn request(id: &str, kind: RequestKind, status: Status, created_at: DateTime<Utc>) -> Request {
    Request {
        id: id.to_string(),
        kind,
        title: format!("{} title", id),
        requester: "Priya Natarajan".to_string(),
        scope: String::new(),
        status,
        priority: Priority::Medium,
        assigned_to: None,
        assigned_team: None,
        created_at,
        updated_at: created_at,
        due_date: None,
        completed_at: None,
        activity_log: Vec::new(),
        notes: Vec::new(),
    }
}

fn build(id: &str, status: BuildStatus) -> Request {
    request(id, RequestKind::Build, Status::Build(status), at(1, 9))
}

fn support(id: &str, status: TicketStatus) -> Request {
    request(id, RequestKind::Support, Status::Ticket(status), at(1, 9))
}

fn window() -> Duration {
    SlaConfig::default().at_risk_window()
}

#[test]
fn test_status_counts_sum_to_collection_size() {
    let requests = vec![
        build("BLD-2026-001", BuildStatus::Intake),
        build("BLD-2026-002", BuildStatus::Triage),
        build("BLD-2026-003", BuildStatus::Triage),
        build("BLD-2026-004", BuildStatus::Deployed),
        support("SUP-2026-001", TicketStatus::New),
    ];

    let all = status_counts(&requests, None);
    assert_eq!(all.total(), requests.len());
    assert_eq!(all.get(Status::Build(BuildStatus::Triage)), 2);

    let builds = status_counts(&requests, Some(RequestKind::Build));
    assert_eq!(builds.total(), 4);
    assert_eq!(builds.counts.len(), BuildStatus::ALL.len());
    assert_eq!(builds.get(Status::Build(BuildStatus::Queue)), 0);
    assert_eq!(builds.get(Status::Ticket(TicketStatus::New)), 0);

    let share: f64 = builds.percentages().values().sum();
    assert!((share - 100.0).abs() < 1e-9);
    assert_eq!(builds.percentages()[&Status::Build(BuildStatus::Triage)], 50.0);
}

#[test]
fn test_status_counts_scoped_by_predicate() {
    let mut requests = vec![
        build("BLD-2026-001", BuildStatus::Intake),
        build("BLD-2026-002", BuildStatus::Triage),
        build("BLD-2026-003", BuildStatus::Testing),
        support("SUP-2026-001", TicketStatus::New),
        support("SUP-2026-002", TicketStatus::Assigned),
    ];
    for (r, scope) in requests
        .iter_mut()
        .zip(["claims", "claims", "finance", "claims", "finance"])
    {
        r.scope = scope.to_string();
    }

    let claims = status_counts_where(&requests, None, |r| r.scope == "claims");
    assert_eq!(claims.total(), 3);
    assert_eq!(claims.get(Status::Build(BuildStatus::Testing)), 0);
    assert_eq!(claims.get(Status::Ticket(TicketStatus::New)), 1);

    let claim_builds = status_counts_where(&requests, Some(RequestKind::Build), |r| {
        r.scope == "claims"
    });
    assert_eq!(claim_builds.total(), 2);
    assert_eq!(claim_builds.counts.len(), BuildStatus::ALL.len());
    assert_eq!(claim_builds.get(Status::Build(BuildStatus::Testing)), 0);
    assert_eq!(claim_builds.get(Status::Build(BuildStatus::Intake)), 1);
    assert!(claim_builds.counts.contains_key(&Status::Build(BuildStatus::Closed)));

    let share: f64 = claim_builds.percentages().values().sum();
    assert!((share - 100.0).abs() < 1e-9);
    assert_eq!(claim_builds.percentages()[&Status::Build(BuildStatus::Triage)], 50.0);

    let none = status_counts_where(&requests, Some(RequestKind::Support), |r| {
        r.scope == "retention"
    });
    assert_eq!(none.total(), 0);
    assert_eq!(none.counts.len(), TicketStatus::ALL.len());
    assert!(percentage_shares(&none.counts).values().all(|p| *p == 0.0));
}

#[test]
fn test_empty_collection_is_all_zeros() {
    let requests: Vec<Request> = Vec::new();
    for kind in RequestKind::ALL {
        let counts = status_counts(&requests, Some(kind));
        assert_eq!(counts.total(), 0);
        assert!(counts.counts.values().all(|n| *n == 0));
        assert!(counts.percentages().values().all(|p| *p == 0.0 && !p.is_nan()));
    }
    assert!(priority_counts(&requests).values().all(|n| *n == 0));
    assert_eq!(completion_rate(&requests), 0.0);
    assert_eq!(average_resolution_hours(&requests), 0.0);

    let summary = summarize(&requests, None, at(2, 9), window());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.active, 0);
    assert_eq!(summary.sla.total(), 0);
    assert!(!summary.completion_rate.is_nan());
}

#[test]
fn test_active_count_excludes_initial_and_terminal() {
    let requests = vec![
        build("BLD-2026-001", BuildStatus::Intake),
        build("BLD-2026-002", BuildStatus::Queue),
        build("BLD-2026-003", BuildStatus::Testing),
        build("BLD-2026-004", BuildStatus::Closed),
        support("SUP-2026-001", TicketStatus::New),
        support("SUP-2026-002", TicketStatus::PendingReview),
        support("SUP-2026-003", TicketStatus::OnHold),
        support("SUP-2026-004", TicketStatus::Completed),
    ];
    assert_eq!(active_count(&requests), 3);
}

#[test]
fn test_sla_classification_boundaries() {
    let now = at(10, 12);
    let mut r = support("SUP-2026-001", TicketStatus::InProgress);

    r.due_date = Some(now - Duration::days(1));
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::Breached);

    r.due_date = Some(now + Duration::days(1));
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::AtRisk);

    r.due_date = Some(now + Duration::days(2));
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::AtRisk);

    r.due_date = Some(now);
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::AtRisk);

    r.due_date = Some(now + Duration::days(2) + Duration::seconds(1));
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::OnTrack);

    r.due_date = Some(now + Duration::days(30));
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::OnTrack);

    r.due_date = None;
    assert_eq!(classify_sla(&r, now, window()), SlaStatus::OnTrack);
}

#[test]
fn test_sla_ignores_terminal_requests() {
    let now = at(10, 12);
    let mut done = support("SUP-2026-001", TicketStatus::Completed);
    done.due_date = Some(now - Duration::days(5));
    let mut cancelled = support("SUP-2026-002", TicketStatus::Cancelled);
    cancelled.due_date = Some(now - Duration::days(5));
    let mut open = support("SUP-2026-003", TicketStatus::New);
    open.due_date = Some(now - Duration::days(5));

    let summary = sla_summary(&[done, cancelled, open], now, window());
    assert_eq!(summary.breached, 1);
    assert_eq!(summary.on_track, 2);
    assert_eq!(summary.total(), 3);
}

#[test]
fn test_sla_is_recomputed_against_now() {
    let mut r = build("BLD-2026-001", BuildStatus::InProgress);
    r.due_date = Some(at(20, 17));
    assert_eq!(classify_sla(&r, at(1, 9), window()), SlaStatus::OnTrack);
    assert_eq!(classify_sla(&r, at(19, 9), window()), SlaStatus::AtRisk);
    assert_eq!(classify_sla(&r, at(21, 9), window()), SlaStatus::Breached);
}

#[test]
fn test_feed_is_newest_first_and_capped() {
    let mut requests = Vec::new();
    for day in 1..=12 {
        let mut r = request(
            &format!("BLD-2026-{:03}", day),
            RequestKind::Build,
            Status::Build(BuildStatus::Triage),
            at(day, 8),
        );
        r.activity_log.push(ActivityEntry {
            id: format!("evt-{}", day),
            actor: "portal-ops".to_string(),
            action: ActivityAction::StatusChanged,
            detail: "intake -> triage".to_string(),
            timestamp: at(day, 10),
        });
        requests.push(r);
    }

    let feed = activity_feed(&requests, 7);
    assert_eq!(feed.len(), 7);
    assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(feed[0].request_id, "BLD-2026-012");
    assert_eq!(feed[0].event, FeedEvent::Activity(ActivityAction::StatusChanged));
    assert_eq!(feed[1].event, FeedEvent::Submitted);

    assert_eq!(activity_feed(&requests, 100).len(), 24);
    assert!(activity_feed(&requests, 0).is_empty());
}

#[test]
fn test_feed_includes_completions() {
    let mut r = support("SUP-2026-001", TicketStatus::Completed);
    r.assigned_to = Some("Dana Reyes".to_string());
    r.completed_at = Some(at(3, 9));
    let feed = activity_feed(&[r], 7);
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].event, FeedEvent::Completed);
    assert_eq!(feed[0].actor, "Dana Reyes");
}

#[test]
fn test_resolution_average_and_completion_rate() {
    let mut a = build("BLD-2026-001", BuildStatus::Deployed);
    a.completed_at = Some(a.created_at + Duration::hours(10));
    let mut b = support("SUP-2026-001", TicketStatus::Completed);
    b.completed_at = Some(b.created_at + Duration::hours(20));
    let c = build("BLD-2026-002", BuildStatus::Closed);
    let d = support("SUP-2026-002", TicketStatus::InProgress);

    let requests = vec![a, b, c, d];
    assert_eq!(average_resolution_hours(&requests), 15.0);
    assert_eq!(completion_rate(&requests), 50.0);
}

#[test]
fn test_summary_over_sample_seed() {
    let requests = sample_seed().unwrap();
    let now = at(1, 9);
    let summary = summarize(&requests, None, now, window());
    assert_eq!(summary.total, requests.len());
    assert_eq!(summary.by_status.total(), requests.len());
    assert_eq!(summary.sla.total(), requests.len());
    assert_eq!(summary.by_priority.values().sum::<usize>(), requests.len());

    let builds = summarize(&requests, Some(RequestKind::Build), now, window());
    let expected = requests.iter().filter(|r| r.kind == RequestKind::Build).count();
    assert_eq!(builds.total, expected);
    assert_eq!(builds.by_status.counts.len(), BuildStatus::ALL.len());
}
