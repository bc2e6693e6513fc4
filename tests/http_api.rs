use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use quest_journal_lib::db::Database;
use quest_journal_lib::journal::JournalCore;
use quest_journal_lib::registry::TypeRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const REGISTRY: &str = r#"{
    "tasks": {"general": "General", "reading": "Reading"},
    "errors": {"logic": "Logic", "inattention": "Inattention"},
    "problems": {"blocked": "Blocked"},
    "knowledge": {"fact": "Fact"}
}"#;

fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(&dir.path().join("journal.sqlite")).expect("database");
    let registry = TypeRegistry::from_json_str(REGISTRY).expect("registry");
    let core = JournalCore::new(Arc::new(db), Arc::new(registry));
    (dir, quest_journal_lib::build_router(Arc::new(core)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn create_origin(app: &Router, name: &str) -> Value {
    let (status, origin) = send(app, "POST", "/origin", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    origin
}

async fn create_quest(app: &Router, origin_id: i64) -> Value {
    let (status, created) = send(
        app,
        "POST",
        "/api/quest",
        Some(json!({
            "theme": "x",
            "origin": origin_id,
            "tasks": [{ "text": "t1", "type": "general", "status": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    created
}

#[tokio::test]
async fn create_quest_stamps_the_origin() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    assert!(origin["last_extracted_at"].is_null());

    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;
    assert!(created["quest"]["id"].as_i64().is_some());
    assert_eq!(created["tasks"][0]["status"], 0);
    assert_eq!(created["tasks"][0]["type"], "general");
    assert!(created["quest"]["completed_at"].is_null());

    let (status, reloaded) = send(&app, "GET", &format!("/origin/{}", origin["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reloaded["last_extracted_at"].is_string());
}

#[tokio::test]
async fn unknown_task_type_is_a_field_error() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/quest",
        Some(json!({
            "theme": "x",
            "origin": origin["id"],
            "tasks": [{ "text": "t", "type": "not-a-real-type", "status": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["tasks[0].type"].is_array());

    let (_, page) = send(&app, "GET", "/quest", None).await;
    assert_eq!(page["quests"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn malformed_body_is_reported_on_body() {
    let (_dir, app) = test_app();
    let (status, body) = send(&app, "POST", "/api/quest", Some(json!({ "theme": "no origin" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn finishing_the_only_task_completes_the_quest() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;
    let quest_id = created["quest"]["id"].as_i64().expect("quest id");
    let task_id = created["tasks"][0]["id"].clone();

    let (status, detail) = send(
        &app,
        "PUT",
        &format!("/api/quest/{}", quest_id),
        Some(json!({
            "tasks": [{ "id": task_id, "status": 1 }],
            "errors": [],
            "problems": [],
            "knowledge": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["quest"]["completed_at"].is_string());
    assert!(detail["quest"]["last_update"].is_string());
    assert_eq!(detail["tasks"][0]["status"], 1);
    assert_eq!(detail["tasks"][0]["text"], "t1");
}

#[tokio::test]
async fn repeated_edit_replaces_reflections() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;
    let quest_id = created["quest"]["id"].as_i64().expect("quest id");
    let payload = json!({
        "tasks": [{ "id": created["tasks"][0]["id"], "status": 0 }],
        "errors": [{ "text": "e1", "type": "logic" }],
        "problems": [],
        "knowledge": []
    });

    for _ in 0..2 {
        let (status, _) = send(&app, "PUT", &format!("/api/quest/{}", quest_id), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, view) = send(&app, "GET", &format!("/api/quest/{}", quest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["errors"], json!([{ "text": "e1", "type": "logic" }]));
    assert_eq!(view["tasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(view["types"]["errors"]["logic"], "Logic");
}

#[tokio::test]
async fn invalid_reflection_type_leaves_the_quest_untouched() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;
    let quest_id = created["quest"]["id"].as_i64().expect("quest id");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/quest/{}", quest_id),
        Some(json!({
            "tasks": [{ "id": created["tasks"][0]["id"], "status": 1 }],
            "knowledge": [{ "text": "k", "type": "rumour" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["knowledge[0].type"].is_array());

    let (_, view) = send(&app, "GET", &format!("/api/quest/{}", quest_id), None).await;
    assert_eq!(view["tasks"][0]["status"], 0);
    assert_eq!(view["knowledge"], json!([]));
}

#[tokio::test]
async fn deleting_an_origin_keeps_its_quests() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;
    let quest_id = created["quest"]["id"].as_i64().expect("quest id");

    let (status, _) = send(&app, "DELETE", &format!("/origin/{}", origin["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/quest/{}", quest_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, page) = send(&app, "GET", "/quest", None).await;
    assert_eq!(page["quests"][0]["id"], quest_id);
    assert!(page["quests"][0]["origin"].is_null());
    assert!(page["quests"][0]["origin_name"].is_null());
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (_dir, app) = test_app();
    for (method, uri, body) in [
        ("GET", "/api/quest/41", None),
        ("PUT", "/api/quest/41", Some(json!({ "tasks": [] }))),
        ("DELETE", "/quest/41", None),
        ("GET", "/origin/41", None),
        ("POST", "/origin/41/start", None),
        ("PUT", "/day/41", Some(json!({ "content": "x" }))),
    ] {
        let (status, response) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert!(response["detail"].is_string());
    }
}

#[tokio::test]
async fn meta_types_lists_the_registry() {
    let (_dir, app) = test_app();
    let (status, types) = send(&app, "GET", "/api/meta/types", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(types["tasks"]["reading"], "Reading");
    assert_eq!(types["problems"], json!({ "blocked": "Blocked" }));
    assert!(types["knowledge"].is_object());
}

#[tokio::test]
async fn create_form_redirects_without_actual_origins() {
    let (_dir, app) = test_app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/quest/create").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|value| value.to_str().ok()),
        Some("/origin")
    );

    let origin = create_origin(&app, "A").await;
    let (status, form) = send(&app, "GET", "/quest/create", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["origin"]["id"], origin["id"]);
    assert!(form["origin"]["last_extracted_at"].is_string());
    assert!(form["types"]["tasks"].is_object());
}

#[tokio::test]
async fn day_page_pages_between_days() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    create_quest(&app, origin["id"].as_i64().expect("id")).await;

    let (status, today) = send(&app, "GET", "/quest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today["quests"].as_array().map(Vec::len), Some(1));
    assert_eq!(today["quests"][0]["tasks_total"], 1);
    assert_eq!(today["quests"][0]["tasks_done"], 0);
    assert_eq!(today["quests"][0]["origin_name"], "A");
    assert_eq!(today["has_previous"], false);
    assert_eq!(today["has_next"], false);

    let date = today["date"].as_str().expect("date").to_string();
    let (status, yesterday) = send(&app, "GET", &format!("/quest?date={}&previous", date), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(yesterday["date"], today["date"]);
    assert_eq!(yesterday["quests"], json!([]));
    assert_eq!(yesterday["has_next"], true);

    let back = yesterday["date"].as_str().expect("date").to_string();
    let (_, again) = send(&app, "GET", &format!("/quest?date={}&next", back), None).await;
    assert_eq!(again["date"], today["date"]);

    let (status, body) = send(&app, "GET", "/quest?date=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["date"].is_array());
}

#[tokio::test]
async fn day_content_and_quest_delete() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    let created = create_quest(&app, origin["id"].as_i64().expect("id")).await;

    let (_, page) = send(&app, "GET", "/quest", None).await;
    let day_id = page["day"]["id"].as_i64().expect("day id");
    let (status, day) = send(&app, "PUT", &format!("/day/{}", day_id), Some(json!({ "content": "calm" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["content"], "calm");

    let (status, _) = send(&app, "DELETE", &format!("/quest/{}", created["quest"]["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, page) = send(&app, "GET", "/quest", None).await;
    assert_eq!(page["quests"], json!([]));
    assert_eq!(page["day"]["content"], "calm");
}

#[tokio::test]
async fn origins_are_managed_over_http() {
    let (_dir, app) = test_app();
    let origin = create_origin(&app, "A").await;
    assert_eq!(origin["status"], "actual");

    let (status, body) = send(&app, "POST", "/origin", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_array());

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/origin/{}", origin["id"]),
        Some(json!({ "name": "A", "status": "frozen" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "frozen");

    let (status, started) = send(&app, "POST", &format!("/origin/{}/start", origin["id"]), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["quest"]["origin"], origin["id"]);
    assert_eq!(started["tasks"], json!([]));

    let (_, list) = send(&app, "GET", "/origin", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}
