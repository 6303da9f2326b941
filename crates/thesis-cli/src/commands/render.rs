//! Terminal rendering.

use colored::{ColoredString, Colorize};
use thesis_application::{Notice, NoticeLevel};
use thesis_core::listing::ListingPage;
use thesis_core::session::Session;
use thesis_core::thesis::{Stage, ThesisRecord};

/// Stage badge, colored by how far along the workflow it is.
pub fn stage_badge(stage: &Stage) -> ColoredString {
    let label = format!("[{stage}]");
    match stage {
        Stage::Submitted | Stage::MentorReview => label.yellow(),
        Stage::SecretaryReview { .. } | Stage::AdministrationReview => label.blue(),
        Stage::CommissionAssignment
        | Stage::DefenseScheduling
        | Stage::CommissionReview { .. } => label.magenta(),
        Stage::Defended { .. } => label.green(),
        Stage::Archived => label.bright_black(),
    }
}

pub fn notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => {
            println!("{}", notice.title.green().bold());
            if !notice.description.is_empty() {
                println!("{}", notice.description);
            }
        }
        NoticeLevel::Error => {
            eprintln!("{}", notice.title.red().bold());
            eprintln!("{}", notice.description.red());
        }
    }
}

pub fn page(page: &ListingPage) -> String {
    let mut out = String::new();
    for record in &page.items {
        out.push_str(&format!(
            "{:>6}  {}  {} ({}, {})\n",
            record.id.as_str().bold(),
            stage_badge(&record.stage()),
            record.title,
            record.student_name,
            record.department
        ));
    }
    if page.truncated {
        out.push_str(&format!(
            "{}\n",
            format!(
                "showing {} of {} matches; narrow the search",
                page.items.len(),
                page.total_matches
            )
            .dimmed()
        ));
    }
    out
}

pub fn record(record: &ThesisRecord) -> String {
    let mut out = format!(
        "{} {}\n  student: {}\n  mentor: {}\n  department: {}\n  submitted: {}\n  {}\n",
        record.title.bold(),
        stage_badge(&record.stage()),
        record.student_name,
        record.mentor_name,
        record.department,
        record.submitted_date.format("%Y-%m-%d"),
        record.description
    );

    if !record.commission_members().is_empty() {
        out.push_str(&format!(
            "  commission: {}\n",
            record.commission_members().join(", ")
        ));
    }
    if let Some(defense) = record.defense() {
        out.push_str(&format!(
            "  defense: {} {} at {}\n",
            defense.date, defense.time, defense.location
        ));
    }
    for document in record.documents() {
        let kind = if document.revision { "revision" } else { "document" };
        out.push_str(&format!("  {kind}: {}\n", document.document.document));
    }
    for filed in record.reports() {
        out.push_str(&format!(
            "  report: {}{}\n",
            filed.report.report,
            filed
                .report
                .grade
                .as_deref()
                .map(|grade| format!(" (grade {grade})"))
                .unwrap_or_default()
        ));
    }

    if !record.validation_history().is_empty() {
        out.push_str(&format!("{}\n", "History".bold()));
        for event in record.validation_history() {
            let phase = event
                .phase
                .map(|phase| format!(" {phase} phase"))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} {}{}: {} - {}\n",
                event.timestamp.format("%Y-%m-%d %H:%M"),
                event.actor_role,
                phase,
                event.decision.to_string().bold(),
                event.comments
            ));
        }
    }
    out
}

pub fn session(session: &Session) -> String {
    let role = session
        .role
        .map(|role| role.to_string())
        .unwrap_or_else(|| "unknown role".to_string());
    let verification = if session.is_verified() {
        "verified".green()
    } else {
        "not yet verified".yellow()
    };
    format!("{} ({role}, {verification})", session.identity.bold())
}
