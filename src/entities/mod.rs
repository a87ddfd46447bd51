//! Records managed by the console
//!
//! - [`identity`]: privileges, users, roles and groups, with the
//!   role↔privilege, role↔user and group↔role associations
//! - [`directory`]: accounts and their contacts

pub mod macros;

pub mod directory;
pub mod identity;

pub use directory::{Account, AccountAssociations, Contact};
pub use identity::{Group, GroupAssociations, Privilege, Role, RoleAssociations, User};

/// Status given to records on creation
pub const STATUS_ACTIVE: &str = "active";

/// Status of records switched off through "change status"
pub const STATUS_DISABLED: &str = "disabled";
