mod common;

use axum::http::StatusCode;
use bson::oid::ObjectId;
use serde_json::{json, Value};

use common::{Factory, TestApp};

#[tokio::test]
async fn test_create_tag_normalizes() {
    let app = TestApp::new();
    let admin = Factory::new(&app.state).create_admin().await;

    let response = app
        .server
        .post("/api/admin/tags")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "name": "  React ", "color": "61dafb" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Tag created");
    assert_eq!(body["data"]["tag"]["name"], "react");
    assert_eq!(body["data"]["tag"]["color"], "#61dafb");
}

#[tokio::test]
async fn test_tag_colors() {
    let app = TestApp::new();
    let admin = Factory::new(&app.state).create_admin().await;

    for (i, color) in ["ABC", "#ABC", "#AABBCC"].iter().enumerate() {
        let response = app
            .server
            .post("/api/admin/tags")
            .add_header("Authorization", admin.auth_header())
            .json(&json!({ "name": format!("ok-{}", i), "color": color }))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert!(response.json::<Value>()["data"]["tag"]["color"]
            .as_str()
            .unwrap()
            .starts_with('#'));
    }

    for color in ["ZZZ", "#12"] {
        let response = app
            .server
            .post("/api/admin/tags")
            .add_header("Authorization", admin.auth_header())
            .json(&json!({ "name": "bad", "color": color }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "color must be a valid hex like #AABBCC or #ABC"
        );
    }
}

#[tokio::test]
async fn test_create_tag_duplicate_name() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    factory.create_tag("react", "#61dafb").await;

    let response = app
        .server
        .post("/api/admin/tags")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "name": "REACT", "color": "#000" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        "Tag with this name already exists"
    );
}

#[tokio::test]
async fn test_list_tags_sorted_by_name() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    factory.create_tag("vue", "#41b883").await;
    factory.create_tag("angular", "#dd0031").await;
    factory.create_tag("react", "#61dafb").await;

    let response = app.server.get("/api/tags").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    let names: Vec<&str> = body["data"]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["angular", "react", "vue"]);
}

#[tokio::test]
async fn test_get_tag_admin_only() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let tag = factory.create_tag("rust", "#dea584").await;
    let path = format!("/api/admin/tags/{}", tag.id);

    app.server.get(&path).await.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["tag"]["name"], "rust");

    let response = app
        .server
        .get(&format!("/api/admin/tags/{}", ObjectId::new()))
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "Tag not found");
}

#[tokio::test]
async fn test_update_tag() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let tag = factory.create_tag("rust", "#dea584").await;
    factory.create_tag("go", "#00add8").await;
    let path = format!("/api/admin/tags/{}", tag.id);

    let empty = app
        .server
        .patch(&path)
        .add_header("Authorization", admin.auth_header())
        .json(&json!({}))
        .await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(empty.json::<Value>()["message"], "Nothing to update");

    let taken = app
        .server
        .patch(&path)
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "name": "Go" }))
        .await;
    taken.assert_status(StatusCode::CONFLICT);

    // Renaming to its own name is not a conflict
    let response = app
        .server
        .patch(&path)
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "name": "Rust", "color": "FFF" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Tag updated");
    assert_eq!(body["data"]["tag"]["name"], "rust");
    assert_eq!(body["data"]["tag"]["color"], "#FFF");
}

#[tokio::test]
async fn test_delete_tag() {
    let app = TestApp::new();
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let tag = factory.create_tag("rust", "#dea584").await;

    let response = app
        .server
        .delete(&format!("/api/admin/tags/{}", tag.id))
        .add_header("Authorization", admin.auth_header())
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Tag deleted");
    assert_eq!(body["data"]["deletedTagId"], tag.id.to_hex());

    let body: Value = app.server.get("/api/tags").await.json();
    assert_eq!(body["data"]["tags"], json!([]));
}
