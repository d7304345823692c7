//! SQLite storage implementation for the security reference table.

mod model;
mod repository;

pub use model::SecurityDB;
pub use repository::SecurityRepository;
