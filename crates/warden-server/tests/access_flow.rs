//! End-to-end flows over the full router: registration, login,
//! ACL-gated access, logout.

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use warden_acl::ImportSource;
use warden_auth::AccessConfig;
use warden_core::RoleId;
use warden_server::{router, AppState};

/// An app wired to the built-in example dataset.
fn demo_app() -> (AppState, Router) {
    let state = AppState::new();
    state
        .importer(RoleId::new("public"))
        .import_from(ImportSource::BuiltinExample)
        .unwrap();
    let app = router(state.clone(), AccessConfig::default());
    (state, app)
}

fn request(method: &str, path: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(http::header::COOKIE, cookie);
    }
    match body {
        Some(value) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(request(method, path, cookie, body))
        .await
        .unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, value)
}

#[tokio::test]
async fn test_first_contact_allows_home_and_sets_one_cookie() {
    let (_state, app) = demo_app();
    let (status, cookie, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("GET"));
    assert!(cookie.unwrap().starts_with("warden_session="));
}

#[tokio::test]
async fn test_anonymous_cannot_reach_undefined_routes() {
    let (_state, app) = demo_app();
    let (status, _cookie, body) = send(&app, "GET", "/secret/files", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["category"], "authorization");
}

#[tokio::test]
async fn test_unmapped_method_is_denied() {
    let (_state, app) = demo_app();
    let (status, _cookie, _body) = send(&app, "TRACE", "/", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_masks_the_password() {
    let (_state, app) = demo_app();
    let (status, _cookie, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "alice@example.com", "password": "sekrit", "name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["password"], "******");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (_state, app) = demo_app();
    let payload = json!({ "email": "alice@example.com", "password": "sekrit" });
    send(&app, "POST", "/register", None, Some(payload.clone())).await;
    let (status, _cookie, _body) = send(&app, "POST", "/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_logout_flow() {
    let (_state, app) = demo_app();
    send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "alice@example.com", "password": "sekrit", "name": "Alice" })),
    )
    .await;

    // Bad credentials are a message, not an error.
    let (status, cookie, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bad credentials");
    let cookie = cookie.expect("first contact sets the session cookie");

    // Good credentials log the session in.
    let (_status, _cookie, body) = send(
        &app,
        "POST",
        "/login",
        Some(&cookie),
        Some(json!({ "email": "alice@example.com", "password": "sekrit" })),
    )
    .await;
    assert_eq!(body["message"], "Logged in");
    assert_eq!(body["user"]["password"], "******");

    // A second login on the same session is a no-op.
    let (_status, _cookie, body) = send(
        &app,
        "POST",
        "/login",
        Some(&cookie),
        Some(json!({ "email": "alice@example.com", "password": "sekrit" })),
    )
    .await;
    assert_eq!(body["message"], "Already logged in");

    // The session now resolves to the user.
    let (_status, _cookie, body) = send(&app, "GET", "/user", Some(&cookie), None).await;
    assert_eq!(body["email"], "alice@example.com");

    // Logout keeps the session, drops the login.
    let (_status, _cookie, body) = send(&app, "POST", "/logout", Some(&cookie), None).await;
    assert_eq!(body["message"], "Logged out");
    assert_eq!(body["session"]["loggedIn"], false);
    // The record retains the user id across logout.
    assert!(body["session"]["userId"].is_string());

    // Same cookie, now anonymous.
    let (status, _cookie, body) = send(&app, "GET", "/user", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Not logged in");
}

#[tokio::test]
async fn test_role_bound_user_reaches_member_area() {
    let (state, app) = demo_app();

    // Register over HTTP and learn the assigned user id.
    let (_status, _cookie, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "bob@example.com", "password": "sekrit", "name": "Bob" })),
    )
    .await;
    let user_id = body["id"].as_str().unwrap().to_string();

    // Import a dataset binding that user to the member role.
    let dataset = json!({
        "roles": [
            { "id": "public", "name": "Public" },
            { "id": "member", "name": "Member" }
        ],
        "permissions": [
            { "id": "login-create", "resourcePattern": "/login", "action": "create" },
            { "id": "member-read", "resourcePattern": "/member/*", "action": "read" }
        ],
        "rolePermissions": [
            { "roleId": "public", "permissionId": "login-create" },
            { "roleId": "member", "permissionId": "member-read" }
        ],
        "userRoles": [
            { "userId": user_id, "roleId": "member" }
        ]
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(dataset.to_string().as_bytes()).unwrap();
    state
        .importer(RoleId::new("public"))
        .import_from(ImportSource::File(file.path().to_path_buf()))
        .unwrap();

    // Log in and reach the member area.
    let (_status, cookie, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "bob@example.com", "password": "sekrit" })),
    )
    .await;
    assert_eq!(body["message"], "Logged in");
    let cookie = cookie.unwrap();

    let (status, _cookie, _body) = send(&app, "GET", "/member/files", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    // Anonymous requests still cannot.
    let (status, _cookie, _body) = send(&app, "GET", "/member/files", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Revocation takes effect on the next request: replace the graph
    // with one that drops the binding.
    let revoked = json!({
        "roles": [{ "id": "public", "name": "Public" }],
        "permissions": [],
        "rolePermissions": [],
        "userRoles": []
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(revoked.to_string().as_bytes()).unwrap();
    state
        .importer(RoleId::new("public"))
        .import_from(ImportSource::File(file.path().to_path_buf()))
        .unwrap();

    let (status, _cookie, _body) = send(&app, "GET", "/member/files", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_user_session_degrades_to_anonymous() {
    let (state, app) = demo_app();
    let (_status, _cookie, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "gone@example.com", "password": "sekrit" })),
    )
    .await;
    let user_id = warden_core::UserId::new(body["id"].as_str().unwrap());

    let (_status, cookie, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "gone@example.com", "password": "sekrit" })),
    )
    .await;
    assert_eq!(body["message"], "Logged in");
    let cookie = cookie.unwrap();

    // Delete the account out from under the live session.
    state.users.remove(&user_id).unwrap();

    let (status, _cookie, body) = send(&app, "GET", "/user", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Not logged in");
}

#[tokio::test]
async fn test_failed_import_keeps_serving_prior_graph() {
    let (state, app) = demo_app();
    let (status, _cookie, _body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // A dataset with a dangling reference must not apply.
    let broken = r#"{"roles": [], "permissions": [], "userRoles": [],
        "rolePermissions": [{"roleId": "ghost", "permissionId": "ghost"}]}"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(broken.as_bytes()).unwrap();
    let err = state
        .importer(RoleId::new("public"))
        .import_from(ImportSource::File(file.path().to_path_buf()))
        .unwrap_err();
    assert!(err.is_referential());

    // Prior graph still serving.
    let (status, _cookie, _body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_persists_across_requests() {
    let (_state, app) = demo_app();
    let (_status, cookie, _body) = send(&app, "GET", "/", None, None).await;
    let cookie = cookie.unwrap();
    // A request with the known cookie never re-sets it.
    let response = app
        .clone()
        .oneshot(request("GET", "/", Some(&cookie), None))
        .await
        .unwrap();
    assert!(response.headers().get(http::header::SET_COOKIE).is_none());
}
