//! View / create / edit state machine shared by record screens
//!
//! ```text
//! VIEW ──edit──▶ EDIT ──save/cancel──▶ (leave)
//! CREATE ─────────────save/cancel──▶ (leave)
//! VIEW ──duplicate──▶ CREATE
//! ```
//!
//! Button visibility is derived from the current mode only; there is no way
//! to set a flag independently.

use crate::core::error::{ConsoleError, ConsoleResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditMode {
    View,
    Create,
    Edit,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditMode::View => "VIEW",
            EditMode::Create => "CREATE",
            EditMode::Edit => "EDIT",
        };
        f.write_str(name)
    }
}

/// User actions gated by the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeAction {
    Edit,
    Save,
    Cancel,
    Delete,
    Duplicate,
    ChangeStatus,
}

impl fmt::Display for ModeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeAction::Edit => "edit",
            ModeAction::Save => "save",
            ModeAction::Cancel => "cancel",
            ModeAction::Delete => "delete",
            ModeAction::Duplicate => "duplicate",
            ModeAction::ChangeStatus => "change status",
        };
        f.write_str(name)
    }
}

/// Where the screen goes after a terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditModeController {
    mode: EditMode,
}

impl EditModeController {
    /// Screen opened on an existing record
    pub fn view() -> Self {
        Self {
            mode: EditMode::View,
        }
    }

    /// Screen opened on a new record
    pub fn create() -> Self {
        Self {
            mode: EditMode::Create,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_allowed(&self, action: ModeAction) -> bool {
        match action {
            ModeAction::Edit => self.show_edit_button(),
            ModeAction::Save => self.show_save_button(),
            ModeAction::Cancel => self.show_cancel_button(),
            ModeAction::Delete => self.show_delete_button(),
            ModeAction::Duplicate => self.show_duplicate_button(),
            ModeAction::ChangeStatus => self.show_change_status_button(),
        }
    }

    pub fn ensure_allowed(&self, action: ModeAction) -> ConsoleResult<()> {
        if self.is_allowed(action) {
            Ok(())
        } else {
            Err(ConsoleError::IllegalAction {
                action,
                mode: self.mode,
            })
        }
    }

    /// VIEW → EDIT
    pub fn transition_to_edit(&mut self) -> ConsoleResult<()> {
        self.ensure_allowed(ModeAction::Edit)?;
        self.mode = EditMode::Edit;
        Ok(())
    }

    /// VIEW → CREATE, for a copy of the viewed record
    pub fn transition_to_duplicate(&mut self) -> ConsoleResult<()> {
        self.ensure_allowed(ModeAction::Duplicate)?;
        self.mode = EditMode::Create;
        Ok(())
    }

    /// Successful save from CREATE or EDIT leaves the screen
    pub fn save(&self) -> ConsoleResult<Navigation> {
        self.ensure_allowed(ModeAction::Save)?;
        Ok(Navigation::Leave)
    }

    /// Cancel from CREATE or EDIT leaves without persisting; VIEW has nothing to discard
    pub fn cancel(&self) -> ConsoleResult<Navigation> {
        self.ensure_allowed(ModeAction::Cancel)?;
        Ok(Navigation::Leave)
    }

    // === Derived flags ===

    pub fn fields_enabled(&self) -> bool {
        matches!(self.mode, EditMode::Create | EditMode::Edit)
    }

    pub fn show_save_button(&self) -> bool {
        matches!(self.mode, EditMode::Create | EditMode::Edit)
    }

    pub fn show_cancel_button(&self) -> bool {
        matches!(self.mode, EditMode::Create | EditMode::Edit)
    }

    pub fn show_edit_button(&self) -> bool {
        self.mode == EditMode::View
    }

    pub fn show_delete_button(&self) -> bool {
        self.mode == EditMode::View
    }

    pub fn show_duplicate_button(&self) -> bool {
        self.mode == EditMode::View
    }

    pub fn show_change_status_button(&self) -> bool {
        self.mode == EditMode::View
    }
}
