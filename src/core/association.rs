//! Diff-on-save editing of many-to-many associations
//!
//! An [`AssociationSync`] pairs two keyed stores over the same target key:
//!
//! - the **pool**: candidates that may be attached, shown with checkboxes;
//! - the **membership**: [`AssociationRecord`]s currently attached to the
//!   owner, each tagged with the [`EditAction`] to apply on save.
//!
//! Checkbox toggles only retag or add/remove membership records locally. The
//! owner submits [`AssociationSync::snapshot`] verbatim when it saves, and
//! the backend applies it with [`settle_associations`].
//!
//! ```text
//!              select                     deselect
//! (absent) ───────────▶ CREATE ──────────────────▶ (absent)
//!   NONE   ◀─────────── DELETE ◀────────────────── NONE / UPDATE
//!              select                     deselect
//! ```

use crate::core::keyed::{KeyFn, KeyedStore, SelectionChange};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Pending operation carried by an association record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditAction {
    /// Already persisted, keep as-is
    #[default]
    None,
    Create,
    Update,
    Delete,
    ChangeStatus,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            EditAction::None => "NONE",
            EditAction::Create => "CREATE",
            EditAction::Update => "UPDATE",
            EditAction::Delete => "DELETE",
            EditAction::ChangeStatus => "CHANGE_STATUS",
        };
        f.write_str(token)
    }
}

/// Join entity between an owner and a target, with its pending action
///
/// On the wire the target's fields are inlined next to `editAction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRecord<T> {
    #[serde(flatten)]
    pub target: T,

    #[serde(default)]
    pub edit_action: EditAction,
}

impl<T> AssociationRecord<T> {
    pub fn new(target: T, edit_action: EditAction) -> Self {
        Self {
            target,
            edit_action,
        }
    }

    /// A record that already exists on the server
    pub fn persisted(target: T) -> Self {
        Self::new(target, EditAction::None)
    }

    /// A record to insert on save
    pub fn created(target: T) -> Self {
        Self::new(target, EditAction::Create)
    }

    pub fn is_created(&self) -> bool {
        self.edit_action == EditAction::Create
    }

    pub fn is_deleted(&self) -> bool {
        self.edit_action == EditAction::Delete
    }
}

/// What [`AssociationSync::remove_member`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// A pending creation was dropped and the pool checkbox cleared
    Discarded,
    /// A persisted record was marked DELETE
    MarkedDeleted,
    /// A pending deletion was undone
    Restored,
    NotFound,
}

/// Number of pending operations in a membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub created: usize,
    pub deleted: usize,
    pub updated: usize,
}

impl PendingCounts {
    pub fn total(&self) -> usize {
        self.created + self.deleted + self.updated
    }
}

/// Candidate pool and tagged membership of one association
pub struct AssociationSync<T, K> {
    pool: KeyedStore<T, K>,
    membership: KeyedStore<AssociationRecord<T>, K>,
}

impl<T, K> AssociationSync<T, K>
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    /// Create an empty synchronizer keyed by the target's identity
    pub fn new(key_fn: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        let key_fn: KeyFn<T, K> = Arc::new(key_fn);
        let target_key = Arc::clone(&key_fn);

        Self {
            pool: KeyedStore::with_key_fn(key_fn),
            membership: KeyedStore::new(move |record: &AssociationRecord<T>| {
                target_key(&record.target)
            }),
        }
    }

    pub fn pool(&self) -> &KeyedStore<T, K> {
        &self.pool
    }

    pub fn membership(&self) -> &KeyedStore<AssociationRecord<T>, K> {
        &self.membership
    }

    /// Seed the membership from the owner's persisted associations
    ///
    /// Every record is considered persisted, so tags are reset to NONE. Any
    /// pending edit is discarded.
    pub fn load_membership(&mut self, records: impl IntoIterator<Item = AssociationRecord<T>>) {
        self.membership.set_data(
            records
                .into_iter()
                .map(|record| AssociationRecord::persisted(record.target)),
        );
        self.sync_pool_selection();
    }

    /// Seed the membership keeping each record's tag
    ///
    /// Used for an owner that was never saved, such as a duplicate whose
    /// associations are all pending creation.
    pub fn resume_membership(&mut self, records: impl IntoIterator<Item = AssociationRecord<T>>) {
        self.membership.set_data(records);
        self.sync_pool_selection();
    }

    /// Load a page of candidates, checking those currently attached
    ///
    /// Paging the pool never touches membership: candidates scrolled out of
    /// view keep their pending tags.
    pub fn load_pool(&mut self, candidates: impl IntoIterator<Item = T>) {
        self.pool.set_data(candidates);
        self.sync_pool_selection();
    }

    fn sync_pool_selection(&mut self) {
        self.pool.clear_selection();
        let attached: Vec<K> = self
            .membership
            .items()
            .filter(|record| !record.is_deleted())
            .map(|record| self.membership.key_of(record))
            .collect();
        for key in &attached {
            self.pool.select(key);
        }
    }

    /// Apply a pool selection-changed event to the membership
    pub fn apply(&mut self, change: &SelectionChange<K>) {
        for key in &change.added {
            match self.pool.find(key).cloned() {
                Some(candidate) => self.on_select(key, candidate),
                None => tracing::warn!(?key, "selected candidate is not loaded in the pool"),
            }
        }
        for key in &change.removed {
            self.on_deselect(key);
        }
    }

    fn on_select(&mut self, key: &K, candidate: T) {
        match self.tag(key) {
            None => {
                tracing::debug!(?key, "association pending creation");
                self.membership.append(AssociationRecord::created(candidate));
            }
            Some(EditAction::Delete) => {
                tracing::debug!(?key, "pending deletion undone");
                self.retag(key, EditAction::None);
            }
            Some(_) => {}
        }
    }

    fn on_deselect(&mut self, key: &K) {
        match self.tag(key) {
            Some(EditAction::Create) => {
                tracing::debug!(?key, "pending creation dropped");
                self.membership.remove(key);
            }
            Some(EditAction::None | EditAction::Update | EditAction::ChangeStatus) => {
                tracing::debug!(?key, "association pending deletion");
                self.retag(key, EditAction::Delete);
            }
            Some(EditAction::Delete) | None => {}
        }
    }

    fn retag(&mut self, key: &K, edit_action: EditAction) {
        if let Some(mut record) = self.membership.find(key).cloned() {
            record.edit_action = edit_action;
            self.membership.replace(key, record);
        }
    }

    /// Tag of the membership record for `key`, if any
    pub fn tag(&self, key: &K) -> Option<EditAction> {
        self.membership.find(key).map(|record| record.edit_action)
    }

    /// Check a candidate (no-op if already checked or not loaded)
    pub fn select_candidate(&mut self, key: &K) -> SelectionChange<K> {
        let change = self.pool.select(key);
        self.apply(&change);
        change
    }

    pub fn deselect_candidate(&mut self, key: &K) -> SelectionChange<K> {
        let change = self.pool.deselect(key);
        self.apply(&change);
        change
    }

    /// Click a candidate's checkbox
    pub fn toggle_candidate(&mut self, key: &K) -> SelectionChange<K> {
        let change = self.pool.toggle(key);
        self.apply(&change);
        change
    }

    /// Click the pool's header checkbox
    pub fn toggle_all_candidates(&mut self) -> SelectionChange<K> {
        let change = self.pool.toggle_select_all();
        self.apply(&change);
        change
    }

    /// Unassign from the membership list rather than the pool
    ///
    /// A pending creation is dropped and its pool checkbox cleared; a
    /// persisted record flips between NONE and DELETE, keeping the pool
    /// checkbox in step.
    pub fn remove_member(&mut self, key: &K) -> RemovalOutcome {
        let Some(tag) = self.tag(key) else {
            return RemovalOutcome::NotFound;
        };

        match tag {
            EditAction::Create => {
                self.membership.remove(key);
                self.pool.deselect(key);
                RemovalOutcome::Discarded
            }
            EditAction::Delete => {
                self.retag(key, EditAction::None);
                self.pool.select(key);
                RemovalOutcome::Restored
            }
            EditAction::None | EditAction::Update | EditAction::ChangeStatus => {
                self.retag(key, EditAction::Delete);
                self.pool.deselect(key);
                RemovalOutcome::MarkedDeleted
            }
        }
    }

    /// Record is a pending addition
    pub fn is_created(&self, key: &K) -> bool {
        self.tag(key) == Some(EditAction::Create)
    }

    /// Record is a pending removal (still listed, rendered struck through)
    pub fn is_deleted(&self, key: &K) -> bool {
        self.tag(key) == Some(EditAction::Delete)
    }

    /// Membership as it must be submitted with the owner, tags included
    pub fn snapshot(&self) -> Vec<AssociationRecord<T>> {
        self.membership.to_vec()
    }

    pub fn pending_counts(&self) -> PendingCounts {
        self.membership
            .items()
            .fold(PendingCounts::default(), |mut counts, record| {
                match record.edit_action {
                    EditAction::Create => counts.created += 1,
                    EditAction::Delete => counts.deleted += 1,
                    EditAction::Update | EditAction::ChangeStatus => counts.updated += 1,
                    EditAction::None => {}
                }
                counts
            })
    }

    pub fn has_pending_changes(&self) -> bool {
        self.pending_counts().total() > 0
    }
}

impl<T: fmt::Debug, K: fmt::Debug> fmt::Debug for AssociationSync<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationSync")
            .field("pool", &self.pool)
            .field("membership", &self.membership)
            .finish()
    }
}

/// Apply a submitted association diff to the persisted list
///
/// NONE entries are left alone, CREATE entries are inserted, DELETE entries
/// are removed and UPDATE entries refresh the stored target. Persisted
/// entries missing from the submission are kept. Every returned record is
/// tagged NONE.
pub fn settle_associations<T, K, F>(
    previous: &[AssociationRecord<T>],
    submitted: &[AssociationRecord<T>],
    key_fn: F,
) -> Vec<AssociationRecord<T>>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut settled: IndexMap<K, T> = previous
        .iter()
        .map(|record| (key_fn(&record.target), record.target.clone()))
        .collect();

    for record in submitted {
        let key = key_fn(&record.target);
        match record.edit_action {
            EditAction::Create => {
                settled.entry(key).or_insert_with(|| record.target.clone());
            }
            EditAction::Delete => {
                settled.shift_remove(&key);
            }
            EditAction::Update | EditAction::ChangeStatus => {
                if let Some(stored) = settled.get_mut(&key) {
                    *stored = record.target.clone();
                }
            }
            EditAction::None => {}
        }
    }

    settled
        .into_values()
        .map(AssociationRecord::persisted)
        .collect()
}

/// Turn a persisted association list into one to recreate on a copy of its owner
pub fn retag_for_copy<T>(records: &mut Vec<AssociationRecord<T>>) {
    records.retain(|record| !record.is_deleted());
    for record in records.iter_mut() {
        record.edit_action = EditAction::Create;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Privilege {
        id: u32,
        name: String,
    }

    fn privilege(id: u32) -> Privilege {
        Privilege {
            id,
            name: format!("PRIV_{id}"),
        }
    }

    fn sync_with(persisted: &[u32], pool: &[u32]) -> AssociationSync<Privilege, u32> {
        let mut sync = AssociationSync::new(|p: &Privilege| p.id);
        sync.load_membership(
            persisted
                .iter()
                .map(|id| AssociationRecord::persisted(privilege(*id))),
        );
        sync.load_pool(pool.iter().map(|id| privilege(*id)));
        sync
    }

    #[test]
    fn test_pool_preselects_members() {
        let sync = sync_with(&[1, 2], &[1, 2, 3]);
        assert!(sync.pool().is_selected(&1));
        assert!(sync.pool().is_selected(&2));
        assert!(!sync.pool().is_selected(&3));
    }

    #[test]
    fn test_select_new_candidate_creates() {
        let mut sync = sync_with(&[], &[1, 2]);
        sync.toggle_candidate(&1);

        assert!(sync.is_created(&1));
        let snapshot = sync.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].edit_action, EditAction::Create);
    }

    #[test]
    fn test_deselect_pending_creation_removes_it() {
        let mut sync = sync_with(&[], &[1]);
        sync.toggle_candidate(&1);
        sync.toggle_candidate(&1);

        assert_eq!(sync.tag(&1), None);
        assert!(sync.snapshot().is_empty());
    }

    #[test]
    fn test_deselect_persisted_marks_delete_and_reselect_restores() {
        let mut sync = sync_with(&[1], &[1]);

        sync.deselect_candidate(&1);
        assert!(sync.is_deleted(&1));
        assert_eq!(sync.membership().len(), 1);

        sync.select_candidate(&1);
        assert_eq!(sync.tag(&1), Some(EditAction::None));
        assert!(!sync.has_pending_changes());
    }

    #[test]
    fn test_update_tag_survives_reselect() {
        let mut sync = sync_with(&[1], &[1]);
        sync.retag(&1, EditAction::Update);

        sync.select_candidate(&1);
        assert_eq!(sync.tag(&1), Some(EditAction::Update));

        sync.deselect_candidate(&1);
        assert!(sync.is_deleted(&1));
    }

    #[test]
    fn test_even_toggles_converge() {
        let mut sync = sync_with(&[1], &[1, 2]);
        for _ in 0..6 {
            sync.toggle_candidate(&1);
            sync.toggle_candidate(&2);
        }
        assert_eq!(sync.tag(&1), Some(EditAction::None));
        assert_eq!(sync.tag(&2), None);
    }

    #[test]
    fn test_remove_member_escape_hatch() {
        let mut sync = sync_with(&[1], &[1, 2]);
        sync.toggle_candidate(&2);

        assert_eq!(sync.remove_member(&2), RemovalOutcome::Discarded);
        assert!(!sync.pool().is_selected(&2));
        assert_eq!(sync.tag(&2), None);

        assert_eq!(sync.remove_member(&1), RemovalOutcome::MarkedDeleted);
        assert!(!sync.pool().is_selected(&1));

        assert_eq!(sync.remove_member(&1), RemovalOutcome::Restored);
        assert!(sync.pool().is_selected(&1));
        assert_eq!(sync.tag(&1), Some(EditAction::None));

        assert_eq!(sync.remove_member(&9), RemovalOutcome::NotFound);
    }

    #[test]
    fn test_pool_paging_keeps_pending_tags() {
        let mut sync = sync_with(&[1], &[1, 2]);
        sync.toggle_candidate(&2);
        sync.toggle_candidate(&1);

        sync.load_pool(vec![privilege(3), privilege(4)]);
        assert!(sync.is_created(&2));
        assert!(sync.is_deleted(&1));

        sync.load_pool(vec![privilege(1), privilege(2)]);
        assert!(!sync.pool().is_selected(&1));
        assert!(sync.pool().is_selected(&2));
    }

    #[test]
    fn test_toggle_all_candidates() {
        let mut sync = sync_with(&[1], &[1, 2, 3]);

        sync.toggle_all_candidates();
        assert!(sync.is_created(&2));
        assert!(sync.is_created(&3));

        sync.toggle_all_candidates();
        assert!(sync.is_deleted(&1));
        assert_eq!(sync.membership().len(), 1);
    }

    #[test]
    fn test_pending_counts() {
        let mut sync = sync_with(&[1, 2], &[1, 2, 3]);
        sync.toggle_candidate(&3);
        sync.toggle_candidate(&1);

        let counts = sync.pending_counts();
        assert_eq!(counts.created, 1);
        assert_eq!(counts.deleted, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_settle_associations() {
        let previous = vec![
            AssociationRecord::persisted(privilege(1)),
            AssociationRecord::persisted(privilege(2)),
            AssociationRecord::persisted(privilege(5)),
        ];
        let mut renamed = privilege(2);
        renamed.name = "RENAMED".to_string();
        let submitted = vec![
            AssociationRecord::new(privilege(1), EditAction::Delete),
            AssociationRecord::new(renamed, EditAction::Update),
            AssociationRecord::created(privilege(3)),
        ];

        let settled = settle_associations(&previous, &submitted, |p: &Privilege| p.id);
        let ids: Vec<u32> = settled.iter().map(|r| r.target.id).collect();
        assert_eq!(ids, vec![2, 5, 3]);
        assert_eq!(settled[0].target.name, "RENAMED");
        assert!(settled.iter().all(|r| r.edit_action == EditAction::None));
    }

    #[test]
    fn test_retag_for_copy() {
        let mut records = vec![
            AssociationRecord::persisted(privilege(1)),
            AssociationRecord::new(privilege(2), EditAction::Delete),
        ];
        retag_for_copy(&mut records);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_created());
    }

    #[test]
    fn test_wire_shape() {
        let record = AssociationRecord::created(privilege(7));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "PRIV_7", "editAction": "CREATE"})
        );

        let back: AssociationRecord<Privilege> =
            serde_json::from_value(serde_json::json!({"id": 7, "name": "PRIV_7"})).unwrap();
        assert_eq!(back.edit_action, EditAction::None);
    }
}
