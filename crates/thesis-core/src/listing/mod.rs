//! Listing projection.
//!
//! A pure, read-only view over fetched records: search, stage filter and an
//! upper bound on the page size.

mod filter;
mod model;

pub use filter::{filter_by_stage, search, select};
pub use model::{ListingPage, ThesisQuery};
