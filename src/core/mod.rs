//! Core module containing the engine: criteria, stores, association diffs and modes

pub mod association;
pub mod error;
pub mod field;
pub mod keyed;
pub mod mode;
pub mod query;
pub mod record;
pub mod service;
pub mod validation;

pub use association::{
    AssociationRecord, AssociationSync, EditAction, PendingCounts, RemovalOutcome,
    settle_associations,
};
pub use error::{ConsoleError, ConsoleResult};
pub use field::{FieldFormat, FieldValue};
pub use keyed::{KeyFn, KeyedStore, SelectionChange};
pub use mode::{EditMode, EditModeController, ModeAction, Navigation};
pub use query::{
    JoinOperator, QueryError, SearchCriteria, SearchMeta, SearchResult, SortClause,
    SortDirection, WhereClause, WhereOperator, WireParams,
};
pub use record::{Record, record_key};
pub use service::RecordService;
pub use validation::{EntityValidationConfig, FieldRule, Violation, ViolationKind, validate};
