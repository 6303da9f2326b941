use super::model::{ListingPage, ThesisQuery};
use crate::thesis::{StageKind, ThesisRecord};

/// Case-insensitive substring match on title or student name. Empty term matches all.
pub fn search<'a>(records: &'a [ThesisRecord], term: &str) -> Vec<&'a ThesisRecord> {
    records.iter().filter(|r| matches_search(r, term)).collect()
}

/// Exact match on the current stage kind. `None` matches all.
pub fn filter_by_stage(records: &[ThesisRecord], stage: Option<StageKind>) -> Vec<&ThesisRecord> {
    records.iter().filter(|r| matches_stage(r, stage)).collect()
}

/// Applies search AND stage filter, then the limit. Order is preserved.
pub fn select(records: &[ThesisRecord], query: &ThesisQuery) -> ListingPage {
    let matches: Vec<&ThesisRecord> = records
        .iter()
        .filter(|r| matches_search(r, &query.search) && matches_stage(r, query.stage))
        .collect();

    let total_matches = matches.len();
    let limit = query.limit.unwrap_or(total_matches);
    ListingPage {
        items: matches.into_iter().take(limit).cloned().collect(),
        total_matches,
        truncated: total_matches > limit,
    }
}

fn matches_search(record: &ThesisRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    record.title.to_lowercase().contains(&term)
        || record.student_name.to_lowercase().contains(&term)
}

fn matches_stage(record: &ThesisRecord, stage: Option<StageKind>) -> bool {
    stage.is_none_or(|kind| record.stage().kind() == kind)
}
