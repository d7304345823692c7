//! Securities module - canonical rows, the store contract and CSV export.

mod securities_export;
mod securities_model;
mod securities_traits;

pub use securities_export::{export_csv, write_csv};
pub use securities_model::{
    Board, Exchange, InsertMode, InsertReport, PartitionReport, SecurityFilter, SecurityList,
    SecurityRecord, TableCreation,
};
pub use securities_traits::SecurityRepositoryTrait;
