//! Remote capability used by list and edit screens

use crate::core::error::ConsoleResult;
use crate::core::query::{SearchCriteria, SearchResult};
use crate::core::record::Record;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for searching and persisting one record type
///
/// Screens only talk to the backend through this trait, so the transport
/// (HTTP client, in-memory store, test double) is swapped by passing a
/// different implementation.
#[async_trait]
pub trait RecordService<T: Record>: Send + Sync {
    /// Run a paginated search
    async fn search(&self, criteria: &SearchCriteria) -> ConsoleResult<SearchResult<T>>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> ConsoleResult<Option<T>>;

    /// Create (no id) or update (id) a record, association diffs included
    async fn save(&self, record: T) -> ConsoleResult<T>;

    /// Delete a record
    async fn delete(&self, id: &Uuid) -> ConsoleResult<()>;
}
