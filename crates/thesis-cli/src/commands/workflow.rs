use super::context::Desk;
use super::render;
use thesis_application::{FormState, Notice};
use thesis_core::gateway::{Acknowledgement, DetailsUpdate, TransitionRequest};
use thesis_core::thesis::{ThesisId, ThesisSubmission, Transition};

/// Result line for a backend acknowledgement.
fn describe(ack: &Acknowledgement) -> String {
    match ack.record() {
        Some(record) => format!(
            "Thesis {} is now {}",
            record.id,
            render::stage_badge(&record.stage())
        ),
        None => ack.message().unwrap_or("Accepted").to_string(),
    }
}

pub async fn submit(desk: &Desk, submission: ThesisSubmission) -> Notice {
    let form = FormState::new(submission);
    let outcome = desk.theses.submit_form(&form).await;
    Notice::from_outcome("Thesis submission", &outcome, describe)
}

pub async fn edit(desk: &Desk, update: DetailsUpdate) -> Notice {
    let outcome = desk.theses.update_details(&update).await;
    Notice::from_outcome("Details update", &outcome, describe)
}

pub async fn transition(desk: &Desk, thesis_id: ThesisId, transition: Transition) -> Notice {
    let action = transition.action_name();
    let outcome = desk
        .theses
        .apply(&TransitionRequest::new(thesis_id, transition))
        .await;
    Notice::from_outcome(action, &outcome, describe)
}
