//! Text rendering for CLI surfaces.
//!
//! JSON mode serializes the same values inside a command envelope; these
//! helpers only cover the human-readable form.

use crate::core::lifecycle::Status;
use crate::core::metrics::{FeedEvent, FeedItem, SlaStatus, Summary};
use crate::core::replay::ReplayReport;
use crate::core::request::Request;
use crate::core::time::to_rfc3339;
use colored::Colorize;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn sla_label(sla: SlaStatus) -> String {
    match sla {
        SlaStatus::Breached => sla.as_str().red().bold().to_string(),
        SlaStatus::AtRisk => sla.as_str().yellow().to_string(),
        SlaStatus::OnTrack => sla.as_str().green().to_string(),
    }
}

pub fn request_line(request: &Request) -> String {
    let owner = request.assigned_to.as_deref().unwrap_or("unassigned");
    format!(
        "- {} [{}|{}|{}] {} ({})",
        request.id,
        request.kind,
        request.status,
        request.priority,
        compact_line(&request.title, 60),
        owner
    )
}

pub fn request_detail(request: &Request, next: &[Status], sla: SlaStatus) -> String {
    let mut out = Vec::new();
    out.push(format!("{} {}", request.id.bold(), request.title));
    out.push(format!("  kind:      {}", request.kind));
    out.push(format!("  status:    {}", request.status));
    out.push(format!("  priority:  {}", request.priority));
    out.push(format!(
        "  assigned:  {}",
        match (&request.assigned_to, &request.assigned_team) {
            (Some(who), Some(team)) => format!("{} ({})", who, team),
            (Some(who), None) => who.clone(),
            (None, Some(team)) => team.clone(),
            (None, None) => "unassigned".to_string(),
        }
    ));
    out.push(format!("  created:   {}", to_rfc3339(&request.created_at)));
    if let Some(due) = &request.due_date {
        out.push(format!("  due:       {} ({})", to_rfc3339(due), sla_label(sla)));
    }
    if next.is_empty() {
        out.push("  next:      (terminal)".to_string());
    } else {
        let names: Vec<_> = next.iter().map(|s| s.as_str()).collect();
        out.push(format!("  next:      {}", names.join(", ")));
    }
    if !request.activity_log.is_empty() {
        out.push("  activity:".to_string());
        for entry in &request.activity_log {
            out.push(format!(
                "    {} {} {} {}",
                to_rfc3339(&entry.timestamp),
                entry.actor,
                entry.action.as_str(),
                entry.detail
            ));
        }
    }
    if !request.notes.is_empty() {
        out.push("  notes:".to_string());
        for note in &request.notes {
            out.push(format!("    - {}", compact_line(note, 100)));
        }
    }
    out.join("\n")
}

pub fn summary_text(summary: &Summary) -> String {
    let mut out = Vec::new();
    let scope = summary
        .kind
        .map(|k| k.to_string())
        .unwrap_or_else(|| "all kinds".to_string());
    out.push(format!(
        "Requests ({}): {} total, {} active",
        scope, summary.total, summary.active
    ));
    out.push("By status:".to_string());
    for (status, count) in &summary.by_status.counts {
        let share = summary.status_share.get(status).copied().unwrap_or(0.0);
        out.push(format!("  {:<15} {:>4}  {:>5.1}%", status.as_str(), count, share));
    }
    out.push("By priority:".to_string());
    for (priority, count) in &summary.by_priority {
        out.push(format!("  {:<15} {:>4}", priority.as_str(), count));
    }
    out.push(format!(
        "SLA: {} {}, {} {}, {} {}",
        summary.sla.breached,
        sla_label(SlaStatus::Breached),
        summary.sla.at_risk,
        sla_label(SlaStatus::AtRisk),
        summary.sla.on_track,
        sla_label(SlaStatus::OnTrack)
    ));
    out.push(format!(
        "Completion rate: {:.1}%  Avg resolution: {:.1}h",
        summary.completion_rate, summary.average_resolution_hours
    ));
    out.join("\n")
}

pub fn feed_line(item: &FeedItem) -> String {
    let event = match item.event {
        FeedEvent::Submitted => "submitted".to_string(),
        FeedEvent::Completed => "completed".to_string(),
        FeedEvent::Activity(action) => action.as_str().to_string(),
    };
    let actor = if item.actor.is_empty() {
        "-"
    } else {
        item.actor.as_str()
    };
    format!(
        "{} {} {} by {}: {}",
        to_rfc3339(&item.timestamp),
        item.request_id,
        event,
        actor,
        compact_line(&item.detail, 80)
    )
}

pub fn replay_text(report: &ReplayReport) -> String {
    let mut out = vec![format!(
        "Replay: {} applied, {} failed",
        report.applied, report.failed
    )];
    for outcome in &report.outcomes {
        if outcome.ok {
            out.push(format!(
                "  line {:>3} {:<10} {} {}",
                outcome.line,
                outcome.op,
                "ok".green(),
                outcome.id.as_deref().unwrap_or("")
            ));
        } else {
            out.push(format!(
                "  line {:>3} {:<10} {} {}",
                outcome.line,
                outcome.op,
                "failed".red(),
                outcome.error.as_deref().unwrap_or("")
            ));
        }
    }
    out.join("\n")
}
