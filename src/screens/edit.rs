//! Detail screen: one record, its mode and its association synchronizers

use crate::core::association::AssociationSync;
use crate::core::error::{ConsoleError, ConsoleResult};
use crate::core::mode::{EditMode, EditModeController, ModeAction, Navigation};
use crate::core::query::{SearchCriteria, SearchMeta};
use crate::core::record::Record;
use crate::core::service::RecordService;
use crate::core::validation::{EntityValidationConfig, Violation, validate};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use uuid::Uuid;

/// The association synchronizers of one owner type
///
/// Implementations hold one [`AssociationSync`] per association field of `T`.
pub trait AssociationSet<T>: Send {
    /// Seed from a persisted owner; every tag becomes NONE
    fn load(&mut self, owner: &T);

    /// Seed from an unsaved owner, keeping its tags
    fn resume(&mut self, owner: &T);

    /// Write each membership, tags included, into the owner's fields
    fn flatten_into(&self, owner: &mut T);

    fn has_pending_changes(&self) -> bool;
}

/// Owners without associations
impl<T> AssociationSet<T> for () {
    fn load(&mut self, _owner: &T) {}

    fn resume(&mut self, _owner: &T) {}

    fn flatten_into(&self, _owner: &mut T) {}

    fn has_pending_changes(&self) -> bool {
        false
    }
}

/// Load one page of candidates into a synchronizer's pool
pub async fn load_candidates<T, K>(
    sync: &mut AssociationSync<T, K>,
    service: &dyn RecordService<T>,
    criteria: &SearchCriteria,
) -> ConsoleResult<SearchMeta>
where
    T: Record,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    let page = service.search(criteria).await?;
    sync.load_pool(page.data);
    Ok(page.meta)
}

/// Controller of a detail screen
pub struct EditController<T: Record, A: AssociationSet<T> = ()> {
    service: Arc<dyn RecordService<T>>,
    validation: EntityValidationConfig,
    mode: EditModeController,
    record: T,
    persisted: Option<T>,
    associations: A,
    loading: Option<ModeAction>,
    message: Option<String>,
    violations: Vec<Violation>,
}

impl<T: Record, A: AssociationSet<T>> EditController<T, A> {
    /// Open an existing record in VIEW mode
    pub async fn open(
        service: Arc<dyn RecordService<T>>,
        validation: EntityValidationConfig,
        mut associations: A,
        id: Uuid,
    ) -> ConsoleResult<Self> {
        let record = service
            .get(&id)
            .await?
            .ok_or_else(|| ConsoleError::NotFound {
                resource: T::resource_name_singular().to_string(),
                id,
            })?;

        associations.load(&record);
        tracing::debug!(resource = T::resource_name_singular(), %id, "record opened");

        Ok(Self {
            service,
            validation,
            mode: EditModeController::view(),
            persisted: Some(record.clone()),
            record,
            associations,
            loading: None,
            message: None,
            violations: Vec::new(),
        })
    }

    /// Start a new record in CREATE mode
    pub fn new_record(
        service: Arc<dyn RecordService<T>>,
        validation: EntityValidationConfig,
        mut associations: A,
        record: T,
    ) -> Self {
        associations.resume(&record);

        Self {
            service,
            validation,
            mode: EditModeController::create(),
            record,
            persisted: None,
            associations,
            loading: None,
            message: None,
            violations: Vec::new(),
        }
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    /// Edit the record's fields; refused while they are disabled
    pub fn record_mut(&mut self) -> ConsoleResult<&mut T> {
        self.ensure_fields_enabled()?;
        Ok(&mut self.record)
    }

    pub fn associations(&self) -> &A {
        &self.associations
    }

    /// Toggle memberships; refused while fields are disabled
    pub fn associations_mut(&mut self) -> ConsoleResult<&mut A> {
        self.ensure_fields_enabled()?;
        Ok(&mut self.associations)
    }

    fn ensure_fields_enabled(&self) -> ConsoleResult<()> {
        if self.mode.fields_enabled() {
            Ok(())
        } else {
            Err(ConsoleError::IllegalAction {
                action: ModeAction::Edit,
                mode: self.mode.mode(),
            })
        }
    }

    pub fn mode(&self) -> &EditModeController {
        &self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Violations found by the last save attempt
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Unsaved field or association edits
    pub fn is_dirty(&self) -> bool {
        match self.mode.mode() {
            EditMode::View => false,
            EditMode::Create => true,
            EditMode::Edit => {
                self.associations.has_pending_changes()
                    || self.persisted.as_ref().is_none_or(|persisted| {
                        serde_json::to_value(persisted).ok() != serde_json::to_value(&self.record).ok()
                    })
            }
        }
    }

    /// VIEW → EDIT
    pub fn edit(&mut self) -> ConsoleResult<()> {
        self.mode.transition_to_edit()
    }

    fn begin(&mut self, action: ModeAction) -> ConsoleResult<()> {
        self.mode.ensure_allowed(action)?;
        if let Some(running) = self.loading {
            return Err(ConsoleError::Busy {
                operation: running.to_string(),
            });
        }
        self.loading = Some(action);
        Ok(())
    }

    fn finish<R>(&mut self, action: &str, result: ConsoleResult<R>) -> ConsoleResult<R> {
        self.loading = None;
        match result {
            Ok(value) => {
                self.message = None;
                Ok(value)
            }
            Err(error) => {
                tracing::warn!(
                    resource = T::resource_name_singular(),
                    action,
                    %error,
                    "request failed"
                );
                self.message = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn settle_saved(&mut self, saved: T) {
        self.associations.load(&saved);
        self.persisted = Some(saved.clone());
        self.record = saved;
        self.mode = EditModeController::view();
    }

    /// Validate, attach the association diffs and submit
    ///
    /// Violations block the call. On failure every synchronizer keeps its
    /// tags so the save can be retried.
    pub async fn save(&mut self) -> ConsoleResult<Navigation> {
        self.mode.ensure_allowed(ModeAction::Save)?;

        let violations = validate(&self.validation, &self.record);
        if !violations.is_empty() {
            tracing::debug!(
                resource = T::resource_name_singular(),
                count = violations.len(),
                "save blocked by validation"
            );
            self.violations = violations.clone();
            return Err(ConsoleError::Validation(violations));
        }
        self.violations.clear();

        self.begin(ModeAction::Save)?;
        let mut submission = self.record.clone();
        self.associations.flatten_into(&mut submission);

        let result = self.service.save(submission).await;
        let saved = self.finish("save", result)?;

        tracing::info!(
            resource = T::resource_name_singular(),
            id = ?saved.id(),
            "record saved"
        );
        let navigation = self.mode.save()?;
        self.settle_saved(saved);
        Ok(navigation)
    }

    /// Drop unsaved edits
    ///
    /// From EDIT the persisted record and its memberships come back and the
    /// screen returns to VIEW.
    pub fn cancel(&mut self) -> ConsoleResult<Navigation> {
        let navigation = self.mode.cancel()?;

        if let Some(persisted) = self.persisted.clone() {
            self.associations.load(&persisted);
            self.record = persisted;
            self.mode = EditModeController::view();
        }
        self.violations.clear();

        Ok(navigation)
    }

    /// Delete the viewed record
    pub async fn delete(&mut self) -> ConsoleResult<Navigation> {
        self.mode.ensure_allowed(ModeAction::Delete)?;
        let id = self
            .record
            .id()
            .ok_or_else(|| ConsoleError::missing_identifier(T::resource_name_singular(), "delete"))?;

        self.begin(ModeAction::Delete)?;
        let result = self.service.delete(&id).await;
        self.finish("delete", result)?;

        tracing::info!(resource = T::resource_name_singular(), %id, "record deleted");
        Ok(Navigation::Leave)
    }

    /// Turn the viewed record into an unsaved copy in CREATE mode
    pub fn duplicate(&mut self) -> ConsoleResult<()> {
        self.mode.transition_to_duplicate()?;

        self.record.prepare_duplicate();
        self.persisted = None;
        self.associations.resume(&self.record);

        tracing::debug!(resource = T::resource_name_singular(), "record duplicated");
        Ok(())
    }

    /// Persist a new status for the viewed record
    ///
    /// The screen stays in VIEW on the saved record.
    pub async fn change_status(&mut self, status: &str) -> ConsoleResult<Navigation> {
        self.mode.ensure_allowed(ModeAction::ChangeStatus)?;
        let id = self.record.id().ok_or_else(|| {
            ConsoleError::missing_identifier(T::resource_name_singular(), "change status of")
        })?;

        self.begin(ModeAction::ChangeStatus)?;
        let mut submission = self.record.clone();
        submission.set_status(status);

        let result = self.service.save(submission).await;
        let saved = self.finish("change status", result)?;

        tracing::info!(resource = T::resource_name_singular(), %id, status, "status changed");
        self.settle_saved(saved);
        Ok(Navigation::Stay)
    }
}
