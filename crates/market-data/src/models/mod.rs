//! Listing and security types shared by sources, normalizers and the store.

mod exchange;
mod listing;

pub use exchange::{Board, Exchange};
pub use listing::{BoardQuery, RawListing, SecurityRecord, SourcePage};
