//! HTTP handlers for record operations
//!
//! Handlers are generic over the record type; one set of routes is mounted
//! per registered resource.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{AssociationDefinition, ConsoleConfig};
use crate::core::error::{ConsoleError, ConsoleResult};
use crate::core::query::{SearchCriteria, SearchResult, WireParams};
use crate::core::record::Record;
use crate::core::service::RecordService;
use crate::core::validation::validate;

/// State shared by the handlers of one resource
pub struct RecordState<T: Record> {
    pub service: Arc<dyn RecordService<T>>,
    pub config: Arc<ConsoleConfig>,
}

impl<T: Record> Clone for RecordState<T> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
        }
    }
}

/// `GET /{plural}/search` with criteria encoded as wire parameters
pub async fn search_records<T: Record>(
    State(state): State<RecordState<T>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ConsoleResult<Json<SearchResult<T>>> {
    let params = WireParams::from(params);
    let mut criteria =
        SearchCriteria::from_wire_params_with_default(&params, state.config.default_page_size)?;
    criteria.page_size = state.config.clamp_page_size(criteria.page_size);

    let result = state.service.search(&criteria).await?;
    Ok(Json(result))
}

/// `GET /{plural}/associations`: association editors of this resource's screen
pub async fn list_associations<T: Record>(
    State(state): State<RecordState<T>>,
) -> Json<Vec<AssociationDefinition>> {
    Json(
        state
            .config
            .associations_of(T::resource_name_singular())
            .cloned()
            .collect(),
    )
}

/// `GET /{plural}/{id}`
pub async fn get_record<T: Record>(
    State(state): State<RecordState<T>>,
    Path(id): Path<Uuid>,
) -> ConsoleResult<Json<T>> {
    state
        .service
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ConsoleError::NotFound {
            resource: T::resource_name_singular().to_string(),
            id,
        })
}

/// `POST /{plural}`: create (no id) or update (id), association diffs included
pub async fn save_record<T: Record>(
    State(state): State<RecordState<T>>,
    Json(record): Json<T>,
) -> ConsoleResult<(StatusCode, Json<T>)> {
    let violations = validate(
        &state.config.validation_for(T::resource_name_singular()),
        &record,
    );
    if !violations.is_empty() {
        return Err(ConsoleError::Validation(violations));
    }

    let status = if record.is_persisted() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    let saved = state.service.save(record).await?;
    Ok((status, Json(saved)))
}

/// `DELETE /{plural}/{id}`
pub async fn delete_record<T: Record>(
    State(state): State<RecordState<T>>,
    Path(id): Path<Uuid>,
) -> ConsoleResult<StatusCode> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
