//! In-memory implementation of RecordService for testing and development

use crate::core::error::{ConsoleError, ConsoleResult};
use crate::core::field::FieldValue;
use crate::core::query::{SearchCriteria, SearchResult, SortClause, SortDirection};
use crate::core::record::{Record, record_key};
use crate::core::service::RecordService;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory record service
///
/// Applies where clauses, a stable multi-key sort and pagination on search,
/// and settles association diffs on save. Records keep insertion order.
#[derive(Clone)]
pub struct InMemoryRecordService<T> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T: Record> InMemoryRecordService<T> {
    /// Create an empty service
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Create a service holding already persisted records
    ///
    /// Records without an id get a fresh one.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let service = Self::new();
        if let Ok(mut store) = service.records.write() {
            for mut record in records {
                let id = record.id().unwrap_or_else(Uuid::new_v4);
                record.set_id(Some(id));
                store.insert(id, record);
            }
        }
        service
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> ConsoleResult<RwLockReadGuard<'_, IndexMap<Uuid, T>>> {
        self.records
            .read()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> ConsoleResult<RwLockWriteGuard<'_, IndexMap<Uuid, T>>> {
        self.records
            .write()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn not_found(id: Uuid) -> ConsoleError {
        ConsoleError::NotFound {
            resource: T::resource_name_singular().to_string(),
            id,
        }
    }
}

impl<T: Record> Default for InMemoryRecordService<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order two records by successive sort clauses; ties keep their current order
fn compare_records<T: Record>(a: &T, b: &T, clauses: &[SortClause]) -> Ordering {
    clauses
        .iter()
        .map(|clause| {
            let left = a.field_value(&clause.name).unwrap_or(FieldValue::Null);
            let right = b.field_value(&clause.name).unwrap_or(FieldValue::Null);
            let ordering = left.compare(&right);
            match clause.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[async_trait]
impl<T: Record> RecordService<T> for InMemoryRecordService<T> {
    async fn search(&self, criteria: &SearchCriteria) -> ConsoleResult<SearchResult<T>> {
        let mut matching: Vec<T> = {
            let records = self.read()?;
            records
                .values()
                .filter(|record| criteria.matches(|field| record.field_value(field)))
                .cloned()
                .collect()
        };

        matching.sort_by(|a, b| compare_records(a, b, &criteria.sort_clauses));

        tracing::debug!(
            resource = T::resource_name(),
            matched = matching.len(),
            page_index = criteria.page_index,
            page_size = criteria.page_size,
            "search executed"
        );

        Ok(SearchResult::paginate(matching, criteria))
    }

    async fn get(&self, id: &Uuid) -> ConsoleResult<Option<T>> {
        let records = self.read()?;
        Ok(records.get(id).cloned())
    }

    async fn save(&self, mut record: T) -> ConsoleResult<T> {
        let mut records = self.write()?;

        let previous = match record.id() {
            Some(id) => Some(
                records
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Self::not_found(id))?,
            ),
            None => {
                record.set_id(Some(Uuid::new_v4()));
                None
            }
        };

        record.settle(previous.as_ref());

        let id = record_key(&record);
        records.insert(id, record.clone());

        tracing::info!(
            resource = T::resource_name_singular(),
            %id,
            created = previous.is_none(),
            "record saved"
        );

        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> ConsoleResult<()> {
        let mut records = self.write()?;

        records
            .shift_remove(id)
            .ok_or_else(|| Self::not_found(*id))?;

        tracing::info!(resource = T::resource_name_singular(), %id, "record deleted");

        Ok(())
    }
}
