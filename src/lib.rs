//! # Admin Console
//!
//! Core of an administrative console for accounts, contacts, users, groups,
//! roles and privileges.
//!
//! ## Features
//!
//! - **Diff-on-save associations**: membership edits are tagged locally
//!   (CREATE / DELETE / NONE) and submitted with the owner
//! - **Search criteria**: filters, sort and pagination with a stable wire mapping
//! - **Keyed stores**: ordered collections with selection, matched by key
//! - **Edit modes**: VIEW / CREATE / EDIT gating which actions are legal
//! - **List/detail screens**: controllers composed from the pieces above
//! - **Reference backend**: in-memory services exposed over REST
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use console::prelude::*;
//!
//! let privileges = Arc::new(InMemoryRecordService::<Privilege>::new());
//! let roles = Arc::new(InMemoryRecordService::<Role>::new());
//!
//! let mut screen = EditController::<Role, _>::new_record(
//!     roles.clone(),
//!     ConsoleConfig::default_config().validation_for("role"),
//!     RoleAssociations::default(),
//!     Role::new("OPS".to_string(), None),
//! );
//!
//! let pool = &mut screen.associations_mut()?.privileges;
//! load_candidates(pool, privileges.as_ref(), &SearchCriteria::default()).await?;
//! screen.save().await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod preferences;
pub mod screens;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        association::{
            AssociationRecord, AssociationSync, EditAction, PendingCounts, RemovalOutcome,
            settle_associations,
        },
        error::{ConsoleError, ConsoleResult},
        field::{FieldFormat, FieldValue},
        keyed::{KeyedStore, SelectionChange},
        mode::{EditMode, EditModeController, ModeAction, Navigation},
        query::{
            JoinOperator, SearchCriteria, SearchMeta, SearchResult, SortClause, SortDirection,
            WhereClause, WhereOperator, WireParams,
        },
        record::{Record, record_key},
        service::RecordService,
        validation::{EntityValidationConfig, FieldRule, Violation, validate},
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Records ===
    pub use crate::entities::{
        Account, AccountAssociations, Contact, Group, GroupAssociations, Privilege, Role,
        RoleAssociations, User,
    };

    // === Screens ===
    pub use crate::screens::{
        AssociationSet, EditController, ListController, ListEvent, load_candidates,
    };

    // === Preferences ===
    pub use crate::preferences::{FilePreferences, InMemoryPreferences, Layout, PreferencesStore};

    // === Storage ===
    pub use crate::storage::InMemoryRecordService;

    // === Config ===
    pub use crate::config::{AssociationDefinition, ConsoleConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, RecordDescriptor, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
