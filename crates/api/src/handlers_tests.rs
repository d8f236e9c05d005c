//! End-to-end handler tests.
//!
//! Requests go through the real router with `tower::ServiceExt::oneshot`
//! against a private in-memory SQLite database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{router, AppState};

async fn app() -> Router {
    let pool = db::pool::create_memory_pool().await.expect("in-memory pool");
    router(AppState::new(pool))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn create_user(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({ "email": email, "hashed_password": "$argon2id$placeholder" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_field(app: &Router, user_id: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/fields",
        Some(json!({ "user_id": user_id, "field_name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_plan(app: &Router, field_id: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/fields/{field_id}/sampling-plans"),
        Some(json!({ "name": name, "grid_size_acres": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

// ============================================================
// health & users
// ============================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn user_response_hides_password_hash() {
    let app = app().await;
    let id = create_user(&app, "grower@example.com").await;

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "grower@example.com");
    assert_eq!(body["verified"], false);
    assert!(body.get("hashed_password").is_none());

    let (status, _) = send(&app, Method::GET, "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================
// groups
// ============================================================

#[tokio::test]
async fn group_lifecycle() {
    let app = app().await;
    let user = create_user(&app, "g@example.com").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/groups",
        Some(json!({ "user_id": user, "name": "Home farm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert!(created["created_at"].is_string());

    let (status, fetched) = send(&app, Method::GET, &format!("/groups/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, renamed) = send(
        &app,
        Method::PATCH,
        &format!("/groups/{id}"),
        Some(json!({ "name": "River farm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "River farm");
    assert_eq!(renamed["user_id"], created["user_id"]);
    assert_eq!(renamed["created_at"], created["created_at"]);

    let (status, body) = send(&app, Method::DELETE, &format!("/groups/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &format!("/groups/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Group not found" }));

    let (status, _) = send(&app, Method::DELETE, &format!("/groups/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn group_rename_requires_a_name() {
    let app = app().await;
    let user = create_user(&app, "rename@example.com").await;
    let (_, group) = send(
        &app,
        Method::POST,
        "/groups",
        Some(json!({ "user_id": user, "name": "G" })),
    )
    .await;
    let uri = format!("/groups/{}", group["id"]);

    for body in [json!({}), json!({ "name": null })] {
        let (status, response) = send(&app, Method::PATCH, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response["detail"].is_string());
    }

    let (_, unchanged) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(unchanged, group);
}

#[tokio::test]
async fn bad_path_and_query_values_get_json_errors() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/groups?user_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string(), "{body}");

    let (status, body) = send(&app, Method::GET, "/groups/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string(), "{body}");

    let (status, body) = send(&app, Method::GET, "/sampling-plans/x/points", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string(), "{body}");
}

#[tokio::test]
async fn patch_missing_group_is_not_found() {
    let app = app().await;
    let (status, _) = send(&app, Method::PATCH, "/groups/5", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn groups_filtered_by_user_newest_first() {
    let app = app().await;
    let alice = create_user(&app, "alice@example.com").await;
    let bob = create_user(&app, "bob@example.com").await;

    for (user, name) in [(alice, "a1"), (bob, "b1"), (alice, "a2")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/groups",
            Some(json!({ "user_id": user, "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, &format!("/groups?user_id={alice}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|g| g["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a2", "a1"]);

    let (_, all) = send(&app, Method::GET, "/groups", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_group_body_is_a_client_error() {
    let app = app().await;

    let (status, _) = send(&app, Method::POST, "/groups", Some(json!({ "name": "no owner" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/groups")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn group_for_unknown_user_conflicts() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/groups",
        Some(json!({ "user_id": 404, "name": "orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================
// fields
// ============================================================

#[tokio::test]
async fn field_round_trip_and_partial_update() {
    let app = app().await;
    let user = create_user(&app, "f@example.com").await;
    let (_, group) = send(
        &app,
        Method::POST,
        "/groups",
        Some(json!({ "user_id": user, "name": "g" })),
    )
    .await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/fields",
        Some(json!({
            "user_id": user,
            "group_id": group["id"],
            "field_name": "North 40",
            "geometry_wkt": "POLYGON ((0 0, 1 0, 1 1, 0 0))",
            "source_file_name": "north.shp",
            "attributes_json": { "crop": "corn", "acres": 40 },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["attributes_json"], json!({ "crop": "corn", "acres": 40 }));
    let id = created["id"].as_i64().unwrap();

    let (_, fetched) = send(&app, Method::GET, &format!("/fields/{id}"), None).await;
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/fields/{id}"),
        Some(json!({ "field_name": "North 40 (east)", "group_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["field_name"], "North 40 (east)");
    assert_eq!(updated["group_id"], Value::Null);
    assert_eq!(updated["geometry_wkt"], created["geometry_wkt"]);
    assert_eq!(updated["source_file_name"], created["source_file_name"]);
    assert_eq!(updated["attributes_json"], created["attributes_json"]);
}

#[tokio::test]
async fn field_name_cannot_be_nulled() {
    let app = app().await;
    let user = create_user(&app, "n@example.com").await;
    let id = create_field(&app, user, "named").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/fields/{id}"),
        Some(json!({ "field_name": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "field_name");
}

#[tokio::test]
async fn fields_filtered_by_user() {
    let app = app().await;
    let alice = create_user(&app, "alice@example.com").await;
    let bob = create_user(&app, "bob@example.com").await;
    create_field(&app, alice, "a").await;
    create_field(&app, bob, "b").await;

    let (_, body) = send(&app, Method::GET, &format!("/fields?user_id={bob}"), None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["field_name"], "b");
}

#[tokio::test]
async fn field_delete_blocked_by_plans() {
    let app = app().await;
    let user = create_user(&app, "d@example.com").await;
    let busy = create_field(&app, user, "busy").await;
    let idle = create_field(&app, user, "idle").await;
    create_plan(&app, busy, "spring").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/fields/{busy}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, Method::GET, &format!("/fields/{busy}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/fields/{idle}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/fields/{idle}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Field not found");
}

// ============================================================
// sampling plans
// ============================================================

#[tokio::test]
async fn plan_defaults_and_listing() {
    let app = app().await;
    let user = create_user(&app, "p@example.com").await;
    let field = create_field(&app, user, "f").await;
    let plan = create_plan(&app, field, "spring").await;

    let (status, body) = send(&app, Method::GET, &format!("/sampling-plans/{plan}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["field_id"], field);
    assert_eq!(body["grid_size_acres"], 2.5);
    assert_eq!(body["grid_offset_x"], 0.0);
    assert_eq!(body["grid_offset_y"], 0.0);
    assert_eq!(body["numbering_method"], "snake");

    let (_, listed) = send(&app, Method::GET, &format!("/fields/{field}/sampling-plans"), None).await;
    assert_eq!(listed, json!([body]));
}

#[tokio::test]
async fn plan_below_minimum_grid_size_is_rejected_before_persisting() {
    let app = app().await;
    let user = create_user(&app, "small@example.com").await;
    let field = create_field(&app, user, "f").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/fields/{field}/sampling-plans"),
        Some(json!({ "name": "tiny", "grid_size_acres": 0.05 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "grid_size_acres");

    let (_, listed) = send(&app, Method::GET, &format!("/fields/{field}/sampling-plans"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn plan_for_missing_field_is_not_found() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/fields/31/sampling-plans",
        Some(json!({ "name": "x", "grid_size_acres": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Field not found");
}

#[tokio::test]
async fn duplicate_plan_name_is_a_server_error() {
    let app = app().await;
    let user = create_user(&app, "dup@example.com").await;
    let field = create_field(&app, user, "f").await;
    create_plan(&app, field, "spring").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/fields/{field}/sampling-plans"),
        Some(json!({ "name": "spring", "grid_size_acres": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================
// sampling points
// ============================================================

#[tokio::test]
async fn points_listed_by_index() {
    let app = app().await;
    let user = create_user(&app, "pts@example.com").await;
    let field = create_field(&app, user, "f").await;
    let plan = create_plan(&app, field, "grid").await;

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/sampling-plans/{plan}/points"),
        Some(json!([
            { "point_index": 2, "geometry_wkt": "POINT (2 2)" },
            { "point_index": 1, "geometry_wkt": "POINT (1 1)", "properties_json": { "zone": "A" } },
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let created_order: Vec<i64> = created.as_array().unwrap().iter().map(|p| p["point_index"].as_i64().unwrap()).collect();
    assert_eq!(created_order, vec![2, 1]);

    let (_, listed) = send(&app, Method::GET, &format!("/sampling-plans/{plan}/points"), None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed[0]["point_index"], 1);
    assert_eq!(listed[0]["properties_json"], json!({ "zone": "A" }));
    assert_eq!(listed[1]["point_index"], 2);
    assert_eq!(listed[1]["properties_json"], Value::Null);
}

#[tokio::test]
async fn points_for_missing_plan_are_not_found_and_not_stored() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/sampling-plans/12/points",
        Some(json!([{ "point_index": 1, "geometry_wkt": "POINT (0 0)" }])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Sampling plan not found");

    let (status, listed) = send(&app, Method::GET, "/sampling-plans/12/points", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn duplicate_index_in_batch_stores_nothing() {
    let app = app().await;
    let user = create_user(&app, "dupidx@example.com").await;
    let field = create_field(&app, user, "f").await;
    let plan = create_plan(&app, field, "grid").await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/sampling-plans/{plan}/points"),
        Some(json!([
            { "point_index": 1, "geometry_wkt": "POINT (0 0)" },
            { "point_index": 1, "geometry_wkt": "POINT (1 1)" },
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, listed) = send(&app, Method::GET, &format!("/sampling-plans/{plan}/points"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn zero_point_index_is_rejected() {
    let app = app().await;
    let user = create_user(&app, "zero@example.com").await;
    let field = create_field(&app, user, "f").await;
    let plan = create_plan(&app, field, "grid").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/sampling-plans/{plan}/points"),
        Some(json!([{ "point_index": 0, "geometry_wkt": "POINT (0 0)" }])),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "[0].point_index");
}

// ============================================================
// lab uploads
// ============================================================

#[tokio::test]
async fn lab_upload_create_and_list() {
    let app = app().await;
    let user = create_user(&app, "lab@example.com").await;
    let field = create_field(&app, user, "f").await;
    let plan = create_plan(&app, field, "grid").await;

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/sampling-plans/{plan}/lab-uploads"),
        Some(json!({ "original_filename": "results.csv", "mapping": { "Sample": "point_index" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["sampling_plan_id"], plan);
    assert_eq!(created["mapping_json"], json!({ "Sample": "point_index" }));

    let (_, listed) = send(&app, Method::GET, &format!("/sampling-plans/{plan}/lab-uploads"), None).await;
    assert_eq!(listed, json!([created]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/sampling-plans/999/lab-uploads",
        Some(json!({ "original_filename": "lost.csv" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
