//! Application layer of Thesis Desk.
//!
//! Use cases orchestrate the gateways behind one explicit session:
//!
//! - [`SessionUseCase`]: login, registration, logout and credential restore
//! - [`ThesisUseCase`]: submission and workflow transitions with local pre-validation
//! - [`ListingUseCase`]: fetch plus the client-side search/filter projection

pub mod form;
pub mod listing_usecase;
pub mod notice;
pub mod session_usecase;
pub mod thesis_usecase;

pub use form::FormState;
pub use listing_usecase::ListingUseCase;
pub use notice::{Notice, NoticeLevel};
pub use session_usecase::SessionUseCase;
pub use thesis_usecase::ThesisUseCase;
