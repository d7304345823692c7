//! Security master core - markets, security lists and the store contract.
//!
//! This crate holds the domain logic: which exchanges make up a market, how a
//! market refreshes its partition and caches its security list, and the
//! repository trait the store implements. It is database-agnostic; the
//! `storage-sqlite` crate provides the implementation.

pub mod constants;
pub mod errors;
pub mod markets;
pub mod securities;

pub use markets::*;
pub use securities::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
