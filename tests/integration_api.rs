//! API Integration Tests
//!
//! DB-backed end-to-end tests against the full router. All tests here need
//! a running PostgreSQL with the migrations applied and DATABASE_URL set,
//! so they are ignored by default:
//!
//!     cargo test -- --ignored

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod common;

/// Build a JSON request, optionally authenticated
fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register a user and return (token, user id)
async fn register_user(app: &Router, username: &str) -> (String, String) {
    let req = json_request(
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "s3cret-pass",
            "fullName": format!("{} Example", username),
        })),
    );

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
    (token, user_id)
}

/// Create an expense from `token` against `debtor_id`, return the expense id
async fn create_expense(app: &Router, token: &str, debtor_id: &str, amount: f64) -> String {
    let req = json_request(
        "POST",
        "/expenses",
        Some(token),
        Some(json!({
            "description": "lunch",
            "amount": amount,
            "debtorId": debtor_id,
        })),
    );

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "expense creation failed");

    let body = response_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_register_then_login() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    register_user(&app, "alice").await;

    // Same credentials log in
    let req = json_request(
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "s3cret-pass"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["token"].as_str().unwrap().len() > 20);

    // The public view never carries credential material
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_duplicate_registration_conflicts() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    register_user(&app, "alice").await;

    // Duplicate username
    let req = json_request(
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "s3cret-pass",
            "fullName": "Other Alice",
        })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username already exists");

    // Duplicate email
    let req = json_request(
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "s3cret-pass",
            "fullName": "Alice Again",
        })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_login_failures_are_indistinguishable() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    register_user(&app, "alice").await;

    // Wrong password for a known user
    let req = json_request(
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong-password"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = response_json(response).await;

    // Unknown username
    let req = json_request(
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "wrong-password"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = response_json(response).await;

    // Same message in both cases, no enumeration signal
    assert_eq!(wrong_password["message"], unknown_user["message"]);
    assert_eq!(wrong_password["message"], "Invalid username or password");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_requests_without_token_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let req = json_request("GET", "/expenses", None, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = json_request("GET", "/expenses", Some("garbage.token.here"), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_customer_lifecycle() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, user_a) = register_user(&app, "alice").await;
    let (_token_b, user_b) = register_user(&app, "bob").await;

    // Adding yourself is rejected
    let req = json_request("POST", &format!("/customers/{}", user_a), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Add B
    let req = json_request("POST", &format!("/customers/{}", user_b), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["username"], "bob");

    // Adding B again conflicts
    let req = json_request("POST", &format!("/customers/{}", user_b), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The edge is directional: B's list is empty, A's has one entry
    let req = json_request("GET", "/customers", Some(&token_a), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Remove, then remove again
    let req = json_request("DELETE", &format!("/customers/{}", user_b), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = json_request("DELETE", &format!("/customers/{}", user_b), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_expense_creation_validation() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, user_a) = register_user(&app, "alice").await;
    let (_token_b, user_b) = register_user(&app, "bob").await;

    // Self-owed expense rejected
    let req = json_request(
        "POST",
        "/expenses",
        Some(&token_a),
        Some(json!({"description": "lunch", "amount": 10, "debtorId": user_a})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Zero amount rejected with a field error
    let req = json_request(
        "POST",
        "/expenses",
        Some(&token_a),
        Some(json!({"description": "lunch", "amount": 0, "debtorId": user_b})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["data"]["amount"].is_string());

    // Unknown debtor rejected
    let req = json_request(
        "POST",
        "/expenses",
        Some(&token_a),
        Some(json!({
            "description": "lunch",
            "amount": 10,
            "debtorId": "00000000-0000-0000-0000-000000000099"
        })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // One cent is the smallest accepted amount
    create_expense(&app, &token_a, &user_b, 0.01).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_expense_access_control() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, _user_a) = register_user(&app, "alice").await;
    let (token_b, user_b) = register_user(&app, "bob").await;
    let (token_c, _user_c) = register_user(&app, "carol").await;

    let expense_id = create_expense(&app, &token_a, &user_b, 50.0).await;

    // A third party may not read
    let req = json_request("GET", &format!("/expenses/{}", expense_id), Some(&token_c), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Creator and debtor both read the same data
    let req = json_request("GET", &format!("/expenses/{}", expense_id), Some(&token_a), None);
    let seen_by_creator = response_json(app.clone().oneshot(req).await.unwrap()).await;
    let req = json_request("GET", &format!("/expenses/{}", expense_id), Some(&token_b), None);
    let seen_by_debtor = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(seen_by_creator["data"], seen_by_debtor["data"]);

    // The debtor can read but not write
    let req = json_request(
        "PUT",
        &format!("/expenses/{}", expense_id),
        Some(&token_b),
        Some(json!({"description": "lunch", "amount": 50, "debtorId": user_b, "status": "PAID"})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor delete
    let req = json_request("DELETE", &format!("/expenses/{}", expense_id), Some(&token_b), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator deletes; a later read is NotFound
    let req = json_request("DELETE", &format!("/expenses/{}", expense_id), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = json_request("GET", &format!("/expenses/{}", expense_id), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_expense_update_semantics() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, user_a) = register_user(&app, "alice").await;
    let (_token_b, user_b) = register_user(&app, "bob").await;
    let (_token_c, user_c) = register_user(&app, "carol").await;

    let expense_id = create_expense(&app, &token_a, &user_b, 20.0).await;

    // Status is retained when omitted
    let req = json_request(
        "PUT",
        &format!("/expenses/{}", expense_id),
        Some(&token_a),
        Some(json!({"description": "dinner", "amount": 25, "debtorId": user_b})),
    );
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"]["description"], "dinner");
    assert_eq!(body["data"]["status"], "PENDING");

    // Status is replaced when provided
    let req = json_request(
        "PUT",
        &format!("/expenses/{}", expense_id),
        Some(&token_a),
        Some(json!({"description": "dinner", "amount": 25, "debtorId": user_b, "status": "PAID"})),
    );
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"]["status"], "PAID");

    // Changing the debtor to the creator is rejected
    let req = json_request(
        "PUT",
        &format!("/expenses/{}", expense_id),
        Some(&token_a),
        Some(json!({"description": "dinner", "amount": 25, "debtorId": user_a})),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Changing the debtor to another existing user works
    let req = json_request(
        "PUT",
        &format!("/expenses/{}", expense_id),
        Some(&token_a),
        Some(json!({"description": "dinner", "amount": 25, "debtorId": user_c})),
    );
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"]["debtor"]["username"], "carol");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_expense_listing_end_to_end() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, _user_a) = register_user(&app, "alice").await;
    let (token_b, user_b) = register_user(&app, "bob").await;

    // A adds B as customer, then records an expense against B
    let req = json_request("POST", &format!("/customers/{}", user_b), Some(&token_a), None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let expense_id = create_expense(&app, &token_a, &user_b, 12.50).await;

    // A's created list contains it
    let req = json_request("GET", "/expenses/created", Some(&token_a), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    let created = body["data"].as_array().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["id"], expense_id.as_str());
    assert_eq!(created[0]["amount"], "12.50");

    // B's debtor list contains it
    let req = json_request("GET", "/expenses/debts", Some(&token_b), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Both full lists contain it exactly once
    for token in [&token_a, &token_b] {
        let req = json_request("GET", "/expenses", Some(token), None);
        let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
        let all = body["data"].as_array().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["description"], "lunch");
    }

    // The pairwise view sees it from either side
    let req = json_request("GET", &format!("/expenses/with/{}", user_b), Some(&token_a), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (DATABASE_URL)"]
async fn test_user_search_excludes_caller() {
    let pool = common::setup_test_db().await;
    let app = common::test_app(pool);

    let (token_a, _user_a) = register_user(&app, "smith_alice").await;
    register_user(&app, "smith_bob").await;

    let req = json_request("GET", "/users/search?query=smith", Some(&token_a), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;

    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["username"], "smith_bob");

    // /users/me returns the caller's own public view
    let req = json_request("GET", "/users/me", Some(&token_a), None);
    let body = response_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(body["data"]["username"], "smith_alice");
}
