//! List screen: criteria, one page of results and row selection
//!
//! Requests run as tasks of the controller's own [`JoinSet`], which is the
//! screen's cancellation scope. Responses are applied one at a time through
//! [`ListController::next_response`]; a search response is only applied if
//! it answers the latest search issued.

use crate::core::error::{ConsoleError, ConsoleResult};
use crate::core::keyed::KeyedStore;
use crate::core::query::{SearchCriteria, SearchMeta, SearchResult};
use crate::core::record::Record;
use crate::core::service::RecordService;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Result of a finished request
enum Completion<T, K> {
    Search {
        sequence: u64,
        result: ConsoleResult<SearchResult<T>>,
    },
    Delete {
        key: K,
        result: ConsoleResult<()>,
    },
}

/// What applying a response did to the screen
#[derive(Debug)]
pub enum ListEvent<K> {
    /// The page was loaded into the store
    Applied { sequence: u64, count: usize },
    /// Answer to a superseded search, dropped
    Stale { sequence: u64 },
    /// The search failed; the store was left untouched
    SearchFailed { sequence: u64, error: ConsoleError },
    Deleted { key: K },
    DeleteFailed { key: K, error: ConsoleError },
    /// A request task panicked or was aborted
    Aborted,
}

/// Controller of a list screen
pub struct ListController<T, K> {
    service: Arc<dyn RecordService<T>>,
    criteria: SearchCriteria,
    default_page_size: usize,
    store: KeyedStore<T, K>,
    meta: Option<SearchMeta>,
    message: Option<String>,
    sequence: u64,
    searching: HashSet<u64>,
    deleting: HashSet<K>,
    tasks: JoinSet<Completion<T, K>>,
    torn_down: bool,
}

impl<T, K> ListController<T, K>
where
    T: Record,
    K: Clone + Eq + Hash + fmt::Debug + Send + 'static,
{
    pub fn new(
        service: Arc<dyn RecordService<T>>,
        key_fn: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            service,
            criteria: SearchCriteria::default(),
            default_page_size: SearchCriteria::default().page_size,
            store: KeyedStore::new(key_fn),
            meta: None,
            message: None,
            sequence: 0,
            searching: HashSet::new(),
            deleting: HashSet::new(),
            tasks: JoinSet::new(),
            torn_down: false,
        }
    }

    /// Page size used by fresh and cleared searches
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self.criteria = SearchCriteria::with_page_size(self.default_page_size);
        self
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn store(&self) -> &KeyedStore<T, K> {
        &self.store
    }

    /// Mutable store access, for row selection
    pub fn store_mut(&mut self) -> &mut KeyedStore<T, K> {
        &mut self.store
    }

    /// Pagination of the page currently shown
    pub fn meta(&self) -> Option<&SearchMeta> {
        self.meta.as_ref()
    }

    /// Last user-visible error, cleared by the next successful response
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        !self.searching.is_empty() || !self.deleting.is_empty()
    }

    pub fn is_deleting(&self, key: &K) -> bool {
        self.deleting.contains(key)
    }

    /// Sequence number of the latest search issued
    pub fn latest_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Replace the criteria wholesale and search; returns the request's sequence number
    pub fn search(&mut self, criteria: SearchCriteria) -> ConsoleResult<u64> {
        if self.torn_down {
            return Err(ConsoleError::ScreenClosed);
        }

        self.criteria = criteria;
        self.sequence += 1;
        let sequence = self.sequence;
        self.searching.insert(sequence);

        tracing::debug!(
            resource = T::resource_name(),
            sequence,
            page_index = self.criteria.page_index,
            "search issued"
        );

        let service = Arc::clone(&self.service);
        let criteria = self.criteria.clone();
        self.tasks.spawn(async move {
            let result = service.search(&criteria).await;
            Completion::Search { sequence, result }
        });

        Ok(sequence)
    }

    /// Search again with the current criteria
    pub fn refresh(&mut self) -> ConsoleResult<u64> {
        self.search(self.criteria.clone())
    }

    /// Reset the criteria to a fresh default and search
    pub fn clear_search(&mut self) -> ConsoleResult<u64> {
        self.search(SearchCriteria::with_page_size(self.default_page_size))
    }

    /// Click a column header: cycle its sort and search from the first page
    pub fn toggle_sort(&mut self, field: &str) -> ConsoleResult<u64> {
        let mut criteria = self.criteria.clone();
        criteria.toggle_sort(field);
        criteria.page_index = 0;
        self.search(criteria)
    }

    pub fn go_to_page(&mut self, page_index: usize) -> ConsoleResult<u64> {
        let mut criteria = self.criteria.clone();
        criteria.page_index = page_index;
        self.search(criteria)
    }

    /// Delete a row
    ///
    /// A row that was never saved is refused before any call, and so is a
    /// row whose deletion is still in flight.
    pub fn delete(&mut self, item: &T) -> ConsoleResult<()> {
        if self.torn_down {
            return Err(ConsoleError::ScreenClosed);
        }

        let id: Uuid = item
            .id()
            .ok_or_else(|| ConsoleError::missing_identifier(T::resource_name_singular(), "delete"))?;

        let key = self.store.key_of(item);
        if !self.deleting.insert(key.clone()) {
            return Err(ConsoleError::Busy {
                operation: format!("delete {}", T::resource_name_singular()),
            });
        }

        tracing::debug!(resource = T::resource_name_singular(), %id, "delete issued");

        let service = Arc::clone(&self.service);
        self.tasks.spawn(async move {
            let result = service.delete(&id).await;
            Completion::Delete { key, result }
        });

        Ok(())
    }

    /// Wait for the next finished request and apply it
    ///
    /// Returns `None` when nothing is in flight or the screen was torn down.
    pub async fn next_response(&mut self) -> Option<ListEvent<K>> {
        if self.torn_down {
            return None;
        }

        let joined = self.tasks.join_next().await?;
        if self.torn_down {
            return None;
        }

        Some(match joined {
            Ok(completion) => self.apply(completion),
            Err(join_error) => {
                tracing::error!(error = %join_error, "list request task did not complete");
                self.message = Some(join_error.to_string());
                if self.tasks.is_empty() {
                    self.searching.clear();
                    self.deleting.clear();
                }
                ListEvent::Aborted
            }
        })
    }

    /// Apply every in-flight response, in completion order
    pub async fn settle(&mut self) -> Vec<ListEvent<K>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_response().await {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, completion: Completion<T, K>) -> ListEvent<K> {
        match completion {
            Completion::Search { sequence, result } => {
                self.searching.remove(&sequence);

                if sequence != self.sequence {
                    tracing::warn!(
                        resource = T::resource_name(),
                        sequence,
                        latest = self.sequence,
                        "discarding stale search response"
                    );
                    return ListEvent::Stale { sequence };
                }

                match result {
                    Ok(page) => {
                        let count = page.data.len();
                        self.store.set_data(page.data);
                        self.meta = Some(page.meta);
                        self.message = None;
                        ListEvent::Applied { sequence, count }
                    }
                    Err(error) => {
                        tracing::warn!(resource = T::resource_name(), sequence, %error, "search failed");
                        self.message = Some(error.to_string());
                        ListEvent::SearchFailed { sequence, error }
                    }
                }
            }
            Completion::Delete { key, result } => {
                self.deleting.remove(&key);

                match result {
                    Ok(()) => {
                        tracing::info!(resource = T::resource_name_singular(), ?key, "record deleted");
                        self.store.remove(&key);
                        self.message = None;
                        ListEvent::Deleted { key }
                    }
                    Err(error) => {
                        tracing::warn!(resource = T::resource_name_singular(), ?key, %error, "delete failed");
                        self.message = Some(error.to_string());
                        ListEvent::DeleteFailed { key, error }
                    }
                }
            }
        }
    }

    /// Abort every in-flight request; later responses are never applied
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        tracing::debug!(
            resource = T::resource_name(),
            in_flight = self.tasks.len(),
            "list screen torn down"
        );
        self.tasks.abort_all();
        self.torn_down = true;
        self.searching.clear();
        self.deleting.clear();
    }
}
