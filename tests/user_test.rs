mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use folio_api::models::Role;
use folio_api::services::AuthService;

use common::{Factory, TestApp, PASSWORD};

#[tokio::test]
async fn test_admin_create_user_with_role() {
    let app = TestApp::new();
    let admin = Factory::new(&app.state).create_admin().await;

    let response = app
        .server
        .post("/api/admin/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "name": "Editor",
            "email": "Editor@Example.com",
            "password": "secret1",
            "role": "admin"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "User created");
    assert_eq!(body["data"]["user"]["email"], "editor@example.com");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_admin_create_rejects_unknown_role() {
    let app = TestApp::new();
    let admin = Factory::new(&app.state).create_admin().await;

    let response = app
        .server
        .post("/api/admin/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "name": "Editor",
            "email": "editor@example.com",
            "password": "secret1",
            "role": "owner"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Invalid role");
}

#[tokio::test]
async fn test_list_users_paginates_and_searches() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    for i in 0..4 {
        factory
            .create_user_with_email(&format!("member{}@example.com", i), Role::User)
            .await;
    }

    let response = app
        .server
        .get("/api/admin/users")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .add_header("Authorization", admin.auth_header())
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["total"], 5);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["hasNext"], true);
    assert_eq!(pagination["hasPrev"], true);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let response = app
        .server
        .get("/api/admin/users")
        .add_query_param("search", "MEMBER3")
        .add_header("Authorization", admin.auth_header())
        .await;

    let body: Value = response.json();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["email"], "member3@example.com");
}

#[tokio::test]
async fn test_list_users_newest_first_and_limit_clamped() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let latest = factory
        .create_user_with_email("latest@example.com", Role::User)
        .await;

    let response = app
        .server
        .get("/api/admin/users")
        .add_query_param("limit", 0)
        .add_query_param("page", "abc")
        .add_header("Authorization", admin.auth_header())
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["pagination"]["limit"], 1);
    assert_eq!(body["data"]["pagination"]["page"], 1);
    assert_eq!(body["data"]["items"][0]["id"], latest.id.to_hex());

    let response = app
        .server
        .get("/api/admin/users")
        .add_query_param("limit", 10000)
        .add_header("Authorization", admin.auth_header())
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_get_user() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let user = factory.create_user().await;

    let response = app
        .server
        .get(&format!("/api/admin/users/{}", user.user_id))
        .add_header("Authorization", admin.auth_header())
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["user"]["email"], user.email);
}

#[tokio::test]
async fn test_get_user_invalid_and_missing_id() {
    let app = TestApp::new();
    let admin = Factory::new(&app.state).create_admin().await;

    let response = app
        .server
        .get("/api/admin/users/not-an-id")
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Invalid user id");

    let response = app
        .server
        .get(&format!("/api/admin/users/{}", bson::oid::ObjectId::new()))
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "User not found");
}

#[tokio::test]
async fn test_update_user_rehashes_password() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let user = factory.create_user().await;

    let response = app
        .server
        .patch(&format!("/api/admin/users/{}", user.user_id))
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "name": "Renamed", "password": "brandnew1" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "User updated");
    assert_eq!(body["data"]["user"]["name"], "Renamed");

    let stored = app
        .state
        .store
        .find_user(user.user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(AuthService::verify_password("brandnew1", &stored.password_hash)
        .await
        .unwrap());
    assert!(!AuthService::verify_password(PASSWORD, &stored.password_hash)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_user_empty_body_writes_nothing() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let user = factory.create_user().await;
    let before = app.state.store.find_user(user.user_id).await.unwrap().unwrap();

    let response = app
        .server
        .patch(&format!("/api/admin/users/{}", user.user_id))
        .add_header("Authorization", admin.auth_header())
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Nothing to update");

    let after = app.state.store.find_user(user.user_id).await.unwrap().unwrap();
    assert_eq!(before.updated_at, after.updated_at);
}

#[tokio::test]
async fn test_update_user_email_conflict_excludes_self() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let user = factory.create_user().await;
    let other = factory.create_user().await;

    let same = app
        .server
        .patch(&format!("/api/admin/users/{}", user.user_id))
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "email": user.email }))
        .await;
    same.assert_status(StatusCode::OK);

    let taken = app
        .server
        .patch(&format!("/api/admin/users/{}", user.user_id))
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "email": other.email }))
        .await;
    taken.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let user = factory.create_user().await;
    let path = format!("/api/admin/users/{}", user.user_id);

    let response = app
        .server
        .delete(&path)
        .add_header("Authorization", admin.auth_header())
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "User deleted");
    assert_eq!(body["data"]["deletedUserId"], user.user_id.to_hex());

    let again = app
        .server
        .delete(&path)
        .add_header("Authorization", admin.auth_header())
        .await;
    again.assert_status(StatusCode::NOT_FOUND);
}
