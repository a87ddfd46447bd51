//! Record trait implemented by every entity the console manages

use crate::core::field::FieldValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use uuid::Uuid;

/// Base trait for all records shown in list and edit screens.
///
/// A record has no id until the server assigns one; saving and deleting
/// check for it before any network call.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "roles", "privileges")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "role")
    fn resource_name_singular() -> &'static str;

    /// Server-assigned identifier, `None` for a record never saved
    fn id(&self) -> Option<Uuid>;

    fn set_id(&mut self, id: Option<Uuid>);

    fn status(&self) -> &str;

    fn set_status(&mut self, status: &str);

    /// Get the value of a scalar field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Resolve the association diffs of a submitted record against the
    /// previously stored version (backend side of diff-on-save)
    fn settle(&mut self, _previous: Option<&Self>) {}

    /// Prepare a copy for creation: clear the id, recreate associations
    fn prepare_duplicate(&mut self) {
        self.set_id(None);
    }

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}

/// Key used to match a record across stores
///
/// Candidates coming from the server always carry an id; an unsaved record
/// maps to the nil UUID.
pub fn record_key<T: Record>(record: &T) -> Uuid {
    record.id().unwrap_or_else(Uuid::nil)
}
