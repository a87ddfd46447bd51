//! Resource registry for auto-generating record routes

use super::handlers::{
    RecordState, delete_record, get_record, list_associations, save_record, search_records,
};
use crate::config::ConsoleConfig;
use crate::core::record::Record;
use crate::core::service::RecordService;
use axum::Router;
use axum::routing::{get, post};
use indexmap::IndexMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait that describes how to build routes for a resource
pub trait EntityDescriptor: Send + Sync {
    /// The resource name (singular, e.g., "role")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "roles")
    fn plural(&self) -> &str;

    /// Build the routes of this resource against the console configuration
    fn build_routes(&self, config: Arc<ConsoleConfig>) -> Router;
}

/// Descriptor of a record type served by a [`RecordService`]
///
/// Mounts:
/// - `GET /{plural}/search`
/// - `GET /{plural}/associations`
/// - `GET /{plural}/{id}`
/// - `POST /{plural}`
/// - `DELETE /{plural}/{id}`
pub struct RecordDescriptor<T: Record> {
    service: Arc<dyn RecordService<T>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordDescriptor<T> {
    pub fn new(service: Arc<dyn RecordService<T>>) -> Self {
        Self {
            service,
            _record: PhantomData,
        }
    }
}

impl<T: Record> EntityDescriptor for RecordDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self, config: Arc<ConsoleConfig>) -> Router {
        let state = RecordState {
            service: Arc::clone(&self.service),
            config,
        };
        let plural = self.plural();

        Router::new()
            .route(&format!("/{plural}"), post(save_record::<T>))
            .route(&format!("/{plural}/search"), get(search_records::<T>))
            .route(
                &format!("/{plural}/associations"),
                get(list_associations::<T>),
            )
            .route(
                &format!("/{plural}/{{id}}"),
                get(get_record::<T>).delete(delete_record::<T>),
            )
            .with_state(state)
    }
}

/// Registry for all resources exposed by the server
///
/// Registering a resource twice replaces the first descriptor.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its resource name
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Build a router with all registered resource routes
    pub fn build_routes(&self, config: Arc<ConsoleConfig>) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes(Arc::clone(&config)))
            })
    }

    /// URL segments of all registered resources, in registration order
    pub fn plurals(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.plural()).collect()
    }

    /// All registered resource names, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}
