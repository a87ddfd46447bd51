//! Macro-generated test suite for `RecordService<TestRecord>` contract validation.
//!
//! The `record_service_tests!` macro generates a test module that validates
//! any `RecordService<TestRecord>` implementation against the contract the
//! console screens rely on: save/get/delete, search across `FieldValue`
//! variants, sort, pagination metadata and the association diff on save.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use console::storage::InMemoryRecordService;
//!
//! record_service_tests!(InMemoryRecordService::<TestRecord>::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_save_assigns_id` / `test_get_nonexistent` / `test_update_existing`
//! - `test_update_nonexistent` / `test_delete_existing` / `test_delete_nonexistent`
//!
//! ## Search
//! - `test_search_string_field`, `test_search_integer_range`,
//!   `test_search_float_field`, `test_search_boolean_field`
//! - `test_search_unknown_field`, `test_search_or_join`
//! - `test_sort_desc`, `test_pagination_meta`, `test_wire_round_trip_search`
//!
//! ## Associations
//! - `test_association_diff_applied`, `test_association_untouched_entries_kept`
//!
//! ## Concurrency
//! - `test_concurrent_saves`

/// Generate a full `RecordService<TestRecord>` conformance test suite.
///
/// `$factory` is re-evaluated for each test. For the concurrent test the
/// service must also be `Clone + 'static`.
#[macro_export]
macro_rules! record_service_tests {
    ($factory:expr) => {
        mod record_service_contract_tests {
            use super::*;
            use console::core::association::{AssociationRecord, EditAction};
            use console::core::error::ConsoleError;
            use console::core::field::FieldValue;
            use console::core::query::{
                JoinOperator, SearchCriteria, SortClause, WhereClause, WhereOperator,
            };
            use console::core::record::Record;
            use console::core::service::RecordService;
            use uuid::Uuid;

            async fn seed<S: RecordService<TestRecord>>(service: &S, count: usize) -> Vec<TestRecord> {
                let mut saved = Vec::new();
                for record in create_test_records(count) {
                    saved.push(service.save(record).await.unwrap());
                }
                saved
            }

            fn names(records: &[TestRecord]) -> Vec<&str> {
                records.iter().map(|r| r.name.as_str()).collect()
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_save_assigns_id() {
                let service = $factory;
                let saved = service
                    .save(create_test_record("Alice", "alice@test.com", 30, 4.5, true))
                    .await
                    .unwrap();

                let id = saved.id().expect("saved record has an id");
                let retrieved = service.get(&id).await.unwrap().unwrap();
                assert_eq!(retrieved, saved);
                assert_eq!(retrieved.status(), "active");
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let service = $factory;
                assert!(service.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_update_existing() {
                let service = $factory;
                let mut saved = seed(&service, 1).await.remove(0);
                saved.name = "Renamed".to_string();
                saved.age = 99;

                service.save(saved.clone()).await.unwrap();
                let retrieved = service.get(&saved.id.unwrap()).await.unwrap().unwrap();
                assert_eq!(retrieved.name, "Renamed");
                assert_eq!(retrieved.age, 99);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let service = $factory;
                let ghost = create_test_record("Ghost", "ghost@test.com", 1, 0.0, false)
                    .with_id(Uuid::new_v4());
                let err = service.save(ghost).await.unwrap_err();
                assert!(matches!(err, ConsoleError::NotFound { .. }));
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let service = $factory;
                let id = seed(&service, 1).await[0].id.unwrap();
                service.delete(&id).await.unwrap();
                assert!(service.get(&id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let service = $factory;
                let err = service.delete(&Uuid::new_v4()).await.unwrap_err();
                assert_eq!(err.error_code(), "NOT_FOUND");
            }

            // ==================================================================
            // Search
            // ==================================================================

            #[tokio::test]
            async fn test_search_string_field() {
                let service = $factory;
                seed(&service, 5).await;

                let criteria = SearchCriteria::default()
                    .with_where(WhereClause::equals("email", "record3@test.com"));
                let result = service.search(&criteria).await.unwrap();
                assert_eq!(names(&result.data), vec!["Record 03"]);
            }

            #[tokio::test]
            async fn test_search_integer_range() {
                let service = $factory;
                seed(&service, 10).await;

                let clause = WhereClause::new(
                    "age",
                    WhereOperator::Between,
                    vec![FieldValue::Integer(22), FieldValue::Integer(24)],
                )
                .unwrap();
                let result = service
                    .search(&SearchCriteria::default().with_where(clause))
                    .await
                    .unwrap();
                assert_eq!(names(&result.data), vec!["Record 02", "Record 03", "Record 04"]);
            }

            #[tokio::test]
            async fn test_search_float_field() {
                let service = $factory;
                seed(&service, 6).await;

                let clause =
                    WhereClause::new("score", WhereOperator::GreaterOrEqual, vec![2.0.into()])
                        .unwrap();
                let result = service
                    .search(&SearchCriteria::default().with_where(clause))
                    .await
                    .unwrap();
                assert_eq!(names(&result.data), vec!["Record 04", "Record 05"]);
            }

            #[tokio::test]
            async fn test_search_boolean_field() {
                let service = $factory;
                seed(&service, 6).await;

                let criteria =
                    SearchCriteria::default().with_where(WhereClause::equals("active", false));
                let result = service.search(&criteria).await.unwrap();
                assert_eq!(result.data.len(), 3);
                assert!(result.data.iter().all(|r| !r.active));
            }

            #[tokio::test]
            async fn test_search_unknown_field() {
                let service = $factory;
                seed(&service, 3).await;

                let criteria =
                    SearchCriteria::default().with_where(WhereClause::equals("nope", "x"));
                assert!(service.search(&criteria).await.unwrap().data.is_empty());
            }

            #[tokio::test]
            async fn test_search_or_join() {
                let service = $factory;
                seed(&service, 5).await;

                let criteria = SearchCriteria::default()
                    .with_where(WhereClause::equals("name", "Record 00"))
                    .with_where(WhereClause::equals("name", "Record 04"))
                    .with_join(JoinOperator::Or);
                let result = service.search(&criteria).await.unwrap();
                assert_eq!(names(&result.data), vec!["Record 00", "Record 04"]);
            }

            #[tokio::test]
            async fn test_sort_desc() {
                let service = $factory;
                seed(&service, 4).await;

                let criteria = SearchCriteria::default().with_sort(SortClause::desc("age"));
                let result = service.search(&criteria).await.unwrap();
                assert_eq!(
                    names(&result.data),
                    vec!["Record 03", "Record 02", "Record 01", "Record 00"]
                );
            }

            #[tokio::test]
            async fn test_pagination_meta() {
                let service = $factory;
                seed(&service, 25).await;

                let criteria = SearchCriteria::default()
                    .with_sort(SortClause::asc("name"))
                    .with_page(2, 10)
                    .with_total(true);
                let result = service.search(&criteria).await.unwrap();

                assert_eq!(result.data.len(), 5);
                assert_eq!(result.meta.total, Some(25));
                assert_eq!(result.meta.offset, 20);
                assert_eq!(result.meta.limit, 10);
                assert_eq!(result.meta.has_next(), Some(false));

                let beyond = service
                    .search(&criteria.clone().with_page(7, 10))
                    .await
                    .unwrap();
                assert!(beyond.data.is_empty());
            }

            #[tokio::test]
            async fn test_wire_round_trip_search() {
                let service = $factory;
                seed(&service, 10).await;

                let criteria = SearchCriteria::default()
                    .with_where(
                        WhereClause::new("age", WhereOperator::GreaterThan, vec![25.into()])
                            .unwrap(),
                    )
                    .with_sort(SortClause::asc("age"));
                let parsed = SearchCriteria::from_wire_params(&criteria.to_wire_params()).unwrap();

                let result = service.search(&parsed).await.unwrap();
                assert_eq!(result.data.first().map(|r| r.age), Some(26));
                assert_eq!(result.data.len(), 4);
            }

            // ==================================================================
            // Associations
            // ==================================================================

            #[tokio::test]
            async fn test_association_diff_applied() {
                let service = $factory;
                let (red, green, blue) = (
                    create_test_tag("red"),
                    create_test_tag("green"),
                    create_test_tag("blue"),
                );

                let mut record = create_test_record("Tagged", "t@test.com", 1, 1.0, true);
                record.tags = vec![
                    AssociationRecord::created(red.clone()),
                    AssociationRecord::created(green.clone()),
                ];
                let mut saved = service.save(record).await.unwrap();
                assert!(saved.tags.iter().all(|t| t.edit_action == EditAction::None));

                saved.tags = vec![
                    AssociationRecord::persisted(red),
                    AssociationRecord::new(green, EditAction::Delete),
                    AssociationRecord::created(blue),
                ];
                let settled = service.save(saved).await.unwrap();
                let labels: Vec<&str> =
                    settled.tags.iter().map(|t| t.target.label.as_str()).collect();
                assert_eq!(labels, vec!["red", "blue"]);

                let stored = service.get(&settled.id.unwrap()).await.unwrap().unwrap();
                assert_eq!(stored.tags, settled.tags);
            }

            #[tokio::test]
            async fn test_association_untouched_entries_kept() {
                let service = $factory;
                let (red, green) = (create_test_tag("red"), create_test_tag("green"));

                let mut record = create_test_record("Tagged", "t@test.com", 1, 1.0, true);
                record.tags = vec![
                    AssociationRecord::created(red),
                    AssociationRecord::created(green.clone()),
                ];
                let mut saved = service.save(record).await.unwrap();

                saved.tags = vec![AssociationRecord::new(green, EditAction::Delete)];
                let settled = service.save(saved).await.unwrap();
                assert_eq!(settled.tags.len(), 1);
                assert_eq!(settled.tags[0].target.label, "red");
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_saves() {
                let service = $factory;
                let mut handles = Vec::new();

                for record in create_test_records(10) {
                    let service = service.clone();
                    handles.push(tokio::spawn(async move { service.save(record).await }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let result = service
                    .search(&SearchCriteria::default().with_total(true))
                    .await
                    .unwrap();
                assert_eq!(result.meta.total, Some(10));
            }
        }
    };
}
