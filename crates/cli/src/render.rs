//! Plain-text renderings for `--output text`.

use std::fmt::Write;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use remedy_core::{ActiveMission, ActiveRemedy, Catalog, StepAction};
use remedy_engine::{Change, MissionView, PassReport, RemedyView};

pub(crate) fn timestamp(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.to_string())
}

fn action_summary(action: &StepAction) -> String {
    match action {
        StepAction::GenerateDocument { template_id } => format!("generate document {}", template_id),
        StepAction::AwaitResponse { deadline } => {
            format!("await response ({} {} days)", deadline.count, deadline.unit)
        }
        StepAction::UserAction { description } => format!("user action: {}", description),
    }
}

pub(crate) fn catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Remedies:\n");
    for d in catalog.remedies() {
        let _ = writeln!(
            out,
            "  {:<18} {} ({}), {} steps",
            d.id,
            d.name,
            d.authority,
            d.steps.len()
        );
    }
    out.push_str("Playbooks:\n");
    for p in catalog.playbooks() {
        let chain: Vec<&str> = p
            .steps
            .iter()
            .map(|s| s.remedy_definition_id.as_str())
            .collect();
        let _ = writeln!(out, "  {:<18} {} [{}]", p.id, p.name, chain.join(" -> "));
    }
    out.trim_end().to_string()
}

pub(crate) fn remedy(view: &RemedyView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Remedy {}", view.instance_id);
    let _ = writeln!(out, "  Definition: {} ({})", view.name, view.definition_id);
    let _ = writeln!(out, "  Authority:  {}", view.authority);
    let _ = writeln!(out, "  Status:     {}", view.status);
    let _ = writeln!(
        out,
        "  Step:       {} [{}] {}",
        view.current_step.title,
        view.current_step.id,
        action_summary(&view.current_step.action)
    );
    if let (Some(deadline), Some(days)) = (view.deadline, view.days_remaining) {
        let _ = writeln!(out, "  Deadline:   {} ({} days remaining)", timestamp(deadline), days);
    }
    if let Some(mission) = &view.mission_instance_id {
        let _ = writeln!(out, "  Mission:    {}", mission);
    }
    if !view.variables.is_empty() {
        let vars: Vec<String> = view
            .variables
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        let _ = writeln!(out, "  Variables:  {}", vars.join(", "));
    }
    if !view.accepts.is_empty() {
        let accepts: Vec<&str> = view.accepts.iter().map(|r| r.as_str()).collect();
        let _ = writeln!(out, "  Accepts:    {}", accepts.join(", "));
    }
    if !view.history.is_empty() {
        out.push_str("  History:\n");
        for entry in &view.history {
            let title = entry.step_title.as_deref().unwrap_or(&entry.step_id);
            let _ = write!(
                out,
                "    {}  {}  {}",
                timestamp(entry.completed_at),
                title,
                entry.result
            );
            if let Some(notes) = &entry.notes {
                let _ = write!(out, "  ({})", notes);
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

pub(crate) fn mission(view: &MissionView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mission {}", view.instance_id);
    let _ = writeln!(out, "  Playbook:   {} ({})", view.name, view.playbook_id);
    let _ = writeln!(out, "  Objective:  {}", view.objective);
    let _ = writeln!(out, "  Status:     {}", view.status);
    let _ = writeln!(
        out,
        "  Step:       {} {}",
        view.current_step_order,
        view.current_step_title.as_deref().unwrap_or("(unknown)")
    );
    if let Some(active) = &view.active_remedy_instance_id {
        let _ = writeln!(out, "  Remedy:     {}", active);
    }
    if view.remedy_instance_ids.len() > 1 {
        let _ = writeln!(out, "  Remedies:   {}", view.remedy_instance_ids.join(", "));
    }
    if let Some(at) = view.concluded_at {
        let _ = writeln!(out, "  Concluded:  {}", timestamp(at));
    }
    out.trim_end().to_string()
}

pub(crate) fn listing(remedies: &[ActiveRemedy], missions: &[ActiveMission]) -> String {
    let mut out = String::new();
    if remedies.is_empty() && missions.is_empty() {
        return "no remedies or missions".to_string();
    }
    for r in remedies {
        let _ = writeln!(
            out,
            "remedy   {}  {:<18} {:<18} {}",
            r.instance_id, r.remedy_definition_id, r.status, r.current_step_id
        );
    }
    for m in missions {
        let _ = writeln!(
            out,
            "mission  {}  {:<18} {:<18} step {}",
            m.instance_id, m.playbook_id, m.status, m.current_step_order
        );
    }
    out.trim_end().to_string()
}

pub(crate) fn pass_report(report: &PassReport) -> String {
    if report.is_quiet() {
        return "no changes".to_string();
    }
    let mut out = String::new();
    for change in &report.changes {
        let line = match change {
            Change::Escalated {
                remedy_instance_id,
                from_step,
                to_step,
                status,
            } => format!(
                "escalated remedy {}: {} -> {} ({})",
                remedy_instance_id, from_step, to_step, status
            ),
            Change::RemedyStarted {
                mission_instance_id,
                remedy_instance_id,
                definition_id,
                order,
            } => format!(
                "mission {} step {}: started {} as remedy {}",
                mission_instance_id, order, definition_id, remedy_instance_id
            ),
            Change::MissionAdvanced {
                mission_instance_id,
                from_order,
                to_order,
            } => format!(
                "mission {} advanced: step {} -> {}",
                mission_instance_id, from_order, to_order
            ),
            Change::MissionConcluded {
                mission_instance_id,
                status,
            } => format!("mission {} concluded: {}", mission_instance_id, status),
        };
        let _ = writeln!(out, "{}", line);
    }
    for fault in &report.faults {
        let _ = writeln!(
            out,
            "fault on {} {}: {}",
            fault.kind, fault.instance_id, fault.message
        );
    }
    out.trim_end().to_string()
}
