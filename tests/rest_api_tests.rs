//! End-to-end tests of the REST backend
//!
//! These tests drive the router the way the console's HTTP client does:
//! criteria travel as wire parameters and association diffs ride along
//! with the owner on save.

use axum_test::TestServer;
use console::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// Test Setup
// =============================================================================

struct TestApp {
    server: TestServer,
    privileges: InMemoryRecordService<Privilege>,
}

fn create_test_app() -> TestApp {
    let privileges = InMemoryRecordService::with_records(
        ["USER_READ", "USER_WRITE", "ROLE_READ", "ROLE_WRITE", "AUDIT_READ"]
            .into_iter()
            .map(|name| Privilege::new(name.to_string(), None)),
    );

    let app = ServerBuilder::new()
        .with_config(ConsoleConfig::default_config())
        .register_service::<Privilege, _>(privileges.clone())
        .register_service::<Role, _>(InMemoryRecordService::new())
        .build();

    let server = TestServer::new(app);
    TestApp { server, privileges }
}

async fn search(server: &TestServer, path: &str, criteria: &SearchCriteria) -> Value {
    let mut request = server.get(path);
    for (key, value) in criteria.to_wire_params().iter() {
        request = request.add_query_param(key, value);
    }
    let response = request.await;
    response.assert_status_ok();
    response.json::<Value>()
}

async fn privilege_named(app: &TestApp, name: &str) -> Privilege {
    let criteria = SearchCriteria::default().with_where(WhereClause::equals("name", name));
    app.privileges
        .search(&criteria)
        .await
        .unwrap()
        .data
        .remove(0)
}

// =============================================================================
// Health Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();

        for path in ["/health", "/healthz"] {
            let response = app.server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "admin-console");
        }
    }
}

// =============================================================================
// Record CRUD Tests
// =============================================================================

mod crud_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let app = create_test_app();

        let response = app
            .server
            .post("/privileges")
            .json(&json!({
                "name": "BILLING_READ",
                "status": "active",
                "description": "Read invoices"
            }))
            .await;
        assert_eq!(response.status_code(), 201);

        let created: Privilege = response.json();
        let id = created.id.unwrap();
        assert_eq!(created.status, "active");

        let response = app.server.get(&format!("/privileges/{}", id)).await;
        response.assert_status_ok();
        let fetched: Privilege = response.json();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_update_existing_returns_200() {
        let app = create_test_app();
        let mut privilege = privilege_named(&app, "AUDIT_READ").await;
        privilege.description = Some("Read the audit trail".to_string());

        let response = app.server.post("/privileges").json(&privilege).await;
        response.assert_status_ok();

        let saved: Privilege = response.json();
        assert_eq!(saved.id, privilege.id);
        assert_eq!(saved.description.as_deref(), Some("Read the audit trail"));
    }

    #[tokio::test]
    async fn test_validation_failure_returns_422() {
        let app = create_test_app();

        let response = app
            .server
            .post("/privileges")
            .json(&json!({ "name": "lower case" }))
            .await;
        assert_eq!(response.status_code(), 422);

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["violations"][0]["field"], "name");
        assert_eq!(body["details"]["violations"][0]["kind"], "format");
        assert_eq!(app.privileges.len(), 5);
    }

    #[tokio::test]
    async fn test_get_unknown_returns_404() {
        let app = create_test_app();
        let id = Uuid::new_v4();

        let response = app.server.get(&format!("/privileges/{}", id)).await;
        assert_eq!(response.status_code(), 404);

        let body: Value = response.json();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["details"]["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_client_error() {
        let app = create_test_app();
        let response = app.server.get("/privileges/not-a-uuid").await;
        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_404() {
        let app = create_test_app();
        let ghost = Privilege::new("GHOST".to_string(), None).with_id(Uuid::new_v4());

        let response = app.server.post("/privileges").json(&ghost).await;
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = create_test_app();
        let id = privilege_named(&app, "ROLE_WRITE").await.id.unwrap();

        let response = app.server.delete(&format!("/privileges/{}", id)).await;
        assert_eq!(response.status_code(), 204);
        assert_eq!(app.privileges.len(), 4);

        let response = app.server.delete(&format!("/privileges/{}", id)).await;
        assert_eq!(response.status_code(), 404);
    }
}

// =============================================================================
// Search Tests
// =============================================================================

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_with_wire_params() {
        let app = create_test_app();
        let criteria = SearchCriteria::default()
            .with_where(WhereClause::like("name", "%_READ"))
            .with_sort(SortClause::desc("name"))
            .with_total(true);

        let body = search(&app.server, "/privileges/search", &criteria).await;

        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["USER_READ", "ROLE_READ", "AUDIT_READ"]);
        assert_eq!(body["searchInfos"]["total"], 3);
        assert_eq!(body["searchInfos"]["calculateStatTotal"], true);
    }

    #[tokio::test]
    async fn test_search_pagination() {
        let app = create_test_app();
        let criteria = SearchCriteria::default()
            .with_sort(SortClause::asc("name"))
            .with_page(1, 2)
            .with_total(true);

        let body = search(&app.server, "/privileges/search", &criteria).await;
        let result: SearchResult<Privilege> = serde_json::from_value(body).unwrap();

        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0].name, "ROLE_WRITE");
        assert_eq!(result.meta.offset, 2);
        assert_eq!(result.meta.total, Some(5));
        assert_eq!(result.meta.total_pages(), Some(3));
        assert_eq!(result.meta.has_next(), Some(true));
    }

    #[tokio::test]
    async fn test_search_without_total_omits_it() {
        let app = create_test_app();
        let body = search(&app.server, "/privileges/search", &SearchCriteria::default()).await;

        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert!(body["searchInfos"].get("total").is_none());
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let app = create_test_app();
        let criteria = SearchCriteria::default().with_page(0, 10_000);

        let body = search(&app.server, "/privileges/search", &criteria).await;
        assert_eq!(body["searchInfos"]["pageSize"], 100);
    }

    #[tokio::test]
    async fn test_unknown_operator_returns_400() {
        let app = create_test_app();

        let response = app
            .server
            .get("/privileges/search")
            .add_query_param("whereClauses[0].name", "name")
            .add_query_param("whereClauses[0].oper", "contains")
            .add_query_param("whereClauses[0].values", "READ")
            .await;
        assert_eq!(response.status_code(), 400);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_overflowing_page_index_returns_400() {
        let app = create_test_app();
        let response = app
            .server
            .get("/privileges/search")
            .add_query_param("pageIndex", "18446744073709551615")
            .add_query_param("pageSize", "2")
            .await;
        assert_eq!(response.status_code(), 400);

        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let app = create_test_app();
        let criteria = SearchCriteria::default().with_page(1_000, 2).with_total(true);

        let body = search(&app.server, "/privileges/search", &criteria).await;
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["searchInfos"]["total"], 5);
        assert_eq!(body["searchInfos"]["offset"], 2_000);
    }

    #[tokio::test]
    async fn test_configured_default_page_size() {
        let privileges = InMemoryRecordService::with_records(
            (0..30).map(|i| Privilege::new(format!("PRIVILEGE_{i:02}"), None)),
        );
        let config = ConsoleConfig {
            default_page_size: 5,
            ..ConsoleConfig::default_config()
        };
        let app = ServerBuilder::new()
            .with_config(config)
            .register_service::<Privilege, _>(privileges)
            .build();
        let server = TestServer::new(app);

        let response = server.get("/privileges/search").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["searchInfos"]["pageSize"], 5);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);

        // An explicit page size still wins
        let response = server
            .get("/privileges/search")
            .add_query_param("pageSize", "8")
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_zero_page_size_returns_400() {
        let app = create_test_app();
        let response = app
            .server
            .get("/privileges/search")
            .add_query_param("pageSize", "0")
            .await;
        assert_eq!(response.status_code(), 400);
    }
}

// =============================================================================
// Association Diff Tests
// =============================================================================

mod association_tests {
    use super::*;

    #[tokio::test]
    async fn test_role_save_applies_membership_diff() {
        let app = create_test_app();
        let user_read = privilege_named(&app, "USER_READ").await;
        let user_write = privilege_named(&app, "USER_WRITE").await;

        let mut role = Role::new("Operators".to_string(), None);
        role.privileges = vec![
            AssociationRecord::new(user_read.clone(), EditAction::Create),
            AssociationRecord::new(user_write.clone(), EditAction::Create),
        ];

        let response = app.server.post("/roles").json(&role).await;
        assert_eq!(response.status_code(), 201);
        let body: Value = response.json();
        assert_eq!(body["privileges"][0]["editAction"], "NONE");
        assert_eq!(body["privileges"][1]["name"], "USER_WRITE");

        let mut saved: Role = serde_json::from_value(body).unwrap();
        saved.privileges = vec![AssociationRecord::new(user_read, EditAction::Delete)];

        let response = app.server.post("/roles").json(&saved).await;
        response.assert_status_ok();
        let updated: Role = response.json();

        let names: Vec<&str> = updated
            .privileges
            .iter()
            .map(|p| p.target.name.as_str())
            .collect();
        assert_eq!(names, vec!["USER_WRITE"]);
        assert!(
            updated
                .privileges
                .iter()
                .all(|p| p.edit_action == EditAction::None)
        );
    }

    #[tokio::test]
    async fn test_association_definitions_of_owner() {
        let app = create_test_app();

        let response = app.server.get("/roles/associations").await;
        response.assert_status_ok();
        let definitions: Vec<AssociationDefinition> = response.json();
        let fields: Vec<&str> = definitions.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["privileges", "users"]);
        assert_eq!(definitions[0].target, "privilege");

        let response = app.server.get("/privileges/associations").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Vec<AssociationDefinition>>(), vec![]);
    }

    #[tokio::test]
    async fn test_unregistered_resource_is_not_routed() {
        let app = create_test_app();
        let response = app.server.get(&format!("/groups/{}", Uuid::new_v4())).await;
        assert_eq!(response.status_code(), 404);
    }
}
