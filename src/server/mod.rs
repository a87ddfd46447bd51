//! Server module exposing record services over HTTP
//!
//! This module provides a `ServerBuilder` that registers, for every record
//! type, the search, get, save and delete routes of its [`RecordService`].
//!
//! [`RecordService`]: crate::core::service::RecordService

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod handlers;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry, RecordDescriptor};
pub use exposure::RestExposure;
pub use handlers::RecordState;
