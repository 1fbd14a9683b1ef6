use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use tracker_core::filter::PageLimits;
use tracker_core::issue::IssueChanges;
use tracker_core::project::NewProject;
use tracker_core::user::User;
use tracker_storage::Storage;

use super::router;
use crate::state::AppState;
use crate::testing::{RecordingStore, new_issue, seed_user};

struct TestApp {
    router: axum::Router,
    store: Arc<RecordingStore>,
    user: User,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(RecordingStore::new());
        let user = seed_user(&store, "Ada");
        let token = store.create_session(&user.id, Duration::hours(1)).unwrap().token;
        store.clear();
        let state = AppState::new(store.clone(), PageLimits::default());
        Self {
            router: router(state),
            store,
            user,
            token,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>, auth: bool) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, false).await
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_requires_session() {
    let app = TestApp::new();
    let payload = json!({"title": "t", "description": "d"});

    let (status, body) = app
        .send(Method::POST, "/api/issues", Some(payload.clone()), false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert!(app.store.writes().is_empty());

    let (status, body) = app
        .send(Method::POST, "/api/issues", Some(payload), true)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["issueType"], "GENERAL");
}

#[tokio::test]
async fn invalid_payload_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/api/issues", Some(json!({"title": "t"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "description is required");
}

#[tokio::test]
async fn missing_issue_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/issues/41").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::PATCH, "/api/issues/41", Some(json!({"title": "x"})), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(app.store.writes().is_empty());
}

#[tokio::test]
async fn delete_returns_created_with_id() {
    let app = TestApp::new();
    let issue = app.store.create_issue(&new_issue("gone")).unwrap();
    let uri = format!("/api/issues/{}", issue.id);

    let (status, body) = app.send(Method::DELETE, &uri, None, true).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": issue.id}));

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_and_links_keep_filters() {
    let app = TestApp::new();
    for i in 0..23 {
        app.store.create_issue(&new_issue(&format!("issue {i:02}"))).unwrap();
    }

    let (status, body) = app
        .get("/api/issues?status=OPEN&sortBy=title&sortOrder=asc&page=3")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 23);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["items"][0]["title"], "issue 20");
    assert_eq!(body["pagination"]["label"], "Page 3 of 3");

    let rels: Vec<&str> = body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert_eq!(rels, vec!["first", "previous"]);
    assert_eq!(
        body["links"][1]["href"],
        "/api/issues?status=OPEN&sortBy=title&sortOrder=asc&page=2"
    );
}

#[tokio::test]
async fn page_past_the_end_links_back_into_range() {
    let app = TestApp::new();
    for i in 0..23 {
        app.store.create_issue(&new_issue(&format!("issue {i:02}"))).unwrap();
    }

    let (status, body) = app.get("/api/issues?page=99").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["pagination"]["label"], "Page 3 of 3");
    assert_eq!(body["pagination"]["currentPage"], 3);
    assert_eq!(
        body["links"],
        json!([
            {"rel": "first", "href": "/api/issues?page=1"},
            {"rel": "previous", "href": "/api/issues?page=2"},
        ])
    );
}

#[tokio::test]
async fn single_page_shows_item_count() {
    let app = TestApp::new();
    app.store.create_issue(&new_issue("only")).unwrap();
    let (_, body) = app.get("/api/issues").await;
    assert_eq!(body["pagination"]["label"], "1 item");
    assert_eq!(body["links"], json!([]));
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/issues?sortBy=priority&sortOrder=asc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_QUERY");
}

#[tokio::test]
async fn status_count_endpoint() {
    let app = TestApp::new();
    app.store.create_issue(&new_issue("a")).unwrap();
    let (status, body) = app.get("/api/issues/status-count?includeAll=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0], json!({"label": "All", "status": "", "count": 1}));
    assert_eq!(body[1]["status"], "OPEN");
}

#[tokio::test]
async fn project_with_issues_cannot_be_deleted() {
    let app = TestApp::new();
    let project = app
        .store
        .create_project(&NewProject {
            name: "Website".into(),
            description: None,
        })
        .unwrap();
    for title in ["a", "b", "c"] {
        let mut issue = new_issue(title);
        issue.project_id = Some(project.id);
        app.store.create_issue(&issue).unwrap();
    }
    app.store.clear();

    let uri = format!("/api/projects/{}", project.id);
    let (status, body) = app.send(Method::DELETE, &uri, None, true).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("has 3 assigned issue(s)")
    );
    assert!(app.store.writes().is_empty());

    let (status, _) = app.send(Method::DELETE, "/api/projects/999", None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_create_and_rename_conflict() {
    let app = TestApp::new();
    let (status, first) = app
        .send(Method::POST, "/api/projects", Some(json!({"name": "Core"})), true)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.send(Method::POST, "/api/projects", Some(json!({"name": "Docs"})), true)
        .await;

    let uri = format!("/api/projects/{}", first["id"]);
    let (status, body) = app
        .send(Method::PUT, &uri, Some(json!({"name": "Docs"})), true)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(json!({"description": "engine"})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "engine");
}

#[tokio::test]
async fn graphql_mutation_uses_bearer_session() {
    let app = TestApp::new();
    let query = json!({"query": "mutation { createIssue(input: {title: \"t\", description: \"d\"}) { id status } }"});

    let (status, body) = app.send(Method::POST, "/graphql", Some(query.clone()), false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

    let (_, body) = app.send(Method::POST, "/graphql", Some(query), true).await;
    assert_eq!(body["data"]["createIssue"]["status"], "OPEN");
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let app = TestApp::new();
    let issue = app.store.create_issue(&new_issue("steady")).unwrap();
    app.store.clear();
    let uri = format!("/api/issues/{}", issue.id);

    let cases = [
        (Method::PATCH, uri.clone(), json!({"status": "BOGUS"})),
        (Method::POST, "/api/issues".to_string(), json!({"title": 5, "description": "d"})),
        (Method::PATCH, format!("{uri}/assignee"), json!({"assignedToUserId": 7})),
        (Method::POST, "/api/projects".to_string(), json!({"name": ["Core"]})),
    ];
    for (method, target, payload) in cases {
        let (status, body) = app.send(method.clone(), &target, Some(payload), true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {target}");
        assert_eq!(body["code"], "VALIDATION_ERROR", "{method} {target}");
        assert!(body["error"].as_str().unwrap().starts_with("malformed request"));
    }
    assert!(app.store.writes().is_empty());

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OPEN");
}

#[tokio::test]
async fn malformed_query_string_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/issues/status-count?includeAll=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_route_applies_changes() {
    let app = TestApp::new();
    let issue = app.store.create_issue(&new_issue("draft")).unwrap();
    app.store.clear();

    let uri = format!("/api/issues/{}", issue.id);
    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(json!({"title": "final", "status": "IN_PROGRESS"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], issue.id);
    assert_eq!(body["title"], "final");
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["description"], "details");
    assert_eq!(app.store.writes(), vec!["update_issue"]);
}

#[tokio::test]
async fn update_route_rejects_dangling_references() {
    let app = TestApp::new();
    let issue = app.store.create_issue(&new_issue("orphan")).unwrap();
    app.store.clear();
    let uri = format!("/api/issues/{}", issue.id);

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(json!({"assignedToUserId": "u-nobody"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ASSIGNEE");

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(json!({"projectId": 999})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PROJECT");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/issues",
            Some(json!({"title": "t", "description": "d", "projectId": 999})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PROJECT");

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("{uri}/assignee"),
            Some(json!({"assignedToUserId": "u-nobody"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ASSIGNEE");

    assert!(app.store.writes().is_empty());
}

#[tokio::test]
async fn assignee_route_sets_and_clears() {
    let app = TestApp::new();
    let issue = app.store.create_issue(&new_issue("triage")).unwrap();
    app.store.clear();
    let uri = format!("/api/issues/{}/assignee", issue.id);

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(json!({"assignedToUserId": app.user.id})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": issue.id, "assignedToUserId": app.user.id}));

    let (_, shown) = app.get(&format!("/api/issues/{}", issue.id)).await;
    assert_eq!(shown["assignedToUser"]["name"], "Ada");

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(json!({"assignedToUserId": null})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": issue.id, "assignedToUserId": null}));
    assert_eq!(app.store.writes(), vec!["update_issue", "update_issue"]);

    let (status, body) = app
        .send(Method::PATCH, "/api/issues/404/assignee", Some(json!({"assignedToUserId": null})), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(app.store.writes().len(), 2);
}

#[tokio::test]
async fn latest_returns_five_newest_with_assignees() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for i in 0..7 {
        ids.push(app.store.create_issue(&new_issue(&format!("issue {i}"))).unwrap().id);
    }
    let newest = *ids.last().unwrap();
    app.store
        .update_issue(
            newest,
            &IssueChanges {
                assigned_to_user_id: Some(Some(app.user.id.clone())),
                ..Default::default()
            },
        )
        .unwrap();

    let (status, body) = app.get("/api/issues/latest").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 5);
    let returned: Vec<i64> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
    let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
    assert_eq!(returned, expected);
    assert_eq!(items[0]["assignedToUser"]["id"], json!(app.user.id));
    assert_eq!(items[1]["assignedToUser"], Value::Null);
}

#[tokio::test]
async fn missing_project_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/projects/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = app
        .send(Method::PUT, "/api/projects/999", Some(json!({"name": "Ghost"})), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(app.store.writes().is_empty());
}
