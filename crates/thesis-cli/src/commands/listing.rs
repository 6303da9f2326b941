use super::context::Desk;
use super::render;
use thesis_application::Notice;
use thesis_core::listing::ThesisQuery;
use thesis_core::thesis::ThesisId;

pub async fn list(desk: &Desk, query: ThesisQuery) -> Notice {
    let outcome = desk.listing.list(&query).await;
    match outcome {
        Ok(page) if page.is_empty() => Notice::success("No theses", "Nothing matches this query"),
        Ok(page) => {
            print!("{}", render::page(&page));
            Notice::success(
                format!("{} of {} theses", page.items.len(), page.total_matches),
                "",
            )
        }
        Err(err) => Notice::error("Listing failed", &err),
    }
}

pub async fn show(desk: &Desk, id: ThesisId) -> Notice {
    let outcome = desk.theses.fetch(&id).await;
    Notice::from_outcome("Thesis", &outcome, render::record)
}
