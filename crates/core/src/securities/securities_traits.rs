use super::securities_model::{
    Exchange, InsertMode, InsertReport, PartitionReport, SecurityFilter, SecurityRecord,
};
use crate::errors::Result;

/// Trait defining the contract for the security store.
///
/// Reads are synchronous and go through the read pool; writes are async and
/// run serially on the store's single writer.
#[async_trait::async_trait]
pub trait SecurityRepositoryTrait: Send + Sync {
    /// Case-insensitive table existence check.
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Run an arbitrary statement with positional text parameters.
    /// Returns the number of affected rows.
    async fn execute(&self, statement: &str, params: Vec<String>) -> Result<usize>;

    /// Write `rows` into `table` according to `mode`.
    async fn insert(
        &self,
        table: &str,
        rows: Vec<SecurityRecord>,
        mode: InsertMode,
    ) -> Result<InsertReport>;

    /// Rows of the security table matching `filter`, ordered by exchange and code.
    /// Empty when the table does not exist yet.
    fn query(&self, filter: &SecurityFilter) -> Result<Vec<SecurityRecord>>;

    /// Delete every row of `exchanges` and insert `rows` in one transaction.
    async fn replace_partition(
        &self,
        exchanges: &[Exchange],
        rows: Vec<SecurityRecord>,
    ) -> Result<PartitionReport>;
}
