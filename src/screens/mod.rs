//! List/detail screen pattern
//!
//! Screens are composed from the core pieces rather than inherited: a
//! [`ListController`] pairs criteria with a keyed store and a record service,
//! an [`EditController`] pairs a record with its mode, validation rules and
//! the synchronizers of its associations.

pub mod edit;
pub mod list;

pub use edit::{AssociationSet, EditController, load_candidates};
pub use list::{ListController, ListEvent};
