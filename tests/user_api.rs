//! User management endpoints, health probes, and rate limiting.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use userhub::storage::UserRepository;

use support::{
    access_token, read_json, register, seed_admin, send_request, setup_test_app,
    setup_test_app_with, test_config, user_id,
};

#[tokio::test]
async fn owner_can_read_and_update_their_account() {
    let app = setup_test_app().await;
    let body = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;
    let token = access_token(&body);
    let id = user_id(&body);

    let response =
        send_request(&app, Method::GET, &format!("/users/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = read_json(response).await;
    assert_eq!(fetched["email"], "bob@example.com");

    let response = send_request(
        &app,
        Method::PATCH,
        &format!("/users/{}", id),
        Some(&token),
        Some(json!({ "name": "Robert" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = read_json(response).await;
    assert_eq!(updated["name"], "Robert");
    assert_eq!(updated["email"], "bob@example.com");
}

#[tokio::test]
async fn users_cannot_touch_other_accounts() {
    let app = setup_test_app().await;
    let alice = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let bob = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;

    let alice_token = access_token(&alice);
    let bob_id = user_id(&bob);

    let response =
        send_request(&app, Method::GET, &format!("/users/{}", bob_id), Some(&alice_token), None)
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send_request(
        &app,
        Method::PATCH,
        &format!("/users/{}", bob_id),
        Some(&alice_token),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_read_any_account() {
    let app = setup_test_app().await;
    let bob = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;
    let admin_token = seed_admin(&app).await;

    let response = send_request(
        &app,
        Method::GET,
        &format!("/users/{}", user_id(&bob)),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = read_json(response).await;
    assert_eq!(fetched["email"], "bob@example.com");
}

#[tokio::test]
async fn listing_users_is_admin_only() {
    let app = setup_test_app().await;
    let bob = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;

    let response = send_request(&app, Method::GET, "/users", Some(&access_token(&bob)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = seed_admin(&app).await;
    let response = send_request(&app, Method::GET, "/users", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = read_json(response).await;
    // Bob plus the seeded admin.
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn listing_paginates() {
    let app = setup_test_app().await;
    for i in 0..4 {
        register(&app, &format!("user{}@example.com", i), "Sw0rdFish!", "User").await;
    }
    let admin_token = seed_admin(&app).await;

    let response =
        send_request(&app, Method::GET, "/users?page=1&perPage=2", Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = read_json(response).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 1);
    assert_eq!(page["perPage"], 2);

    let response =
        send_request(&app, Method::GET, "/users?page=3&perPage=2", Some(&admin_token), None).await;
    let last: Value = read_json(response).await;
    assert_eq!(last["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_users_is_admin_only() {
    let app = setup_test_app().await;
    let bob = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;
    let bob_token = access_token(&bob);
    let bob_id = user_id(&bob);

    // Even the owner cannot delete their own account.
    let response =
        send_request(&app, Method::DELETE, &format!("/users/{}", bob_id), Some(&bob_token), None)
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = seed_admin(&app).await;
    let response =
        send_request(&app, Method::DELETE, &format!("/users/{}", bob_id), Some(&admin_token), None)
            .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response =
        send_request(&app, Method::GET, &format!("/users/{}", bob_id), Some(&admin_token), None)
            .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count = app.repository.count_users().await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = setup_test_app().await;
    let admin_token = seed_admin(&app).await;

    let response = send_request(
        &app,
        Method::GET,
        "/users/00000000-0000-0000-0000-000000000000",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_request(
        &app,
        Method::DELETE,
        "/users/00000000-0000-0000-0000-000000000000",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_to_a_taken_email_is_conflict() {
    let app = setup_test_app().await;
    register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let bob = register(&app, "bob@example.com", "Sw0rdFish!", "Bob").await;

    let response = send_request(
        &app,
        Method::PATCH,
        &format!("/users/{}", user_id(&bob)),
        Some(&access_token(&bob)),
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_probes_respond_without_authentication() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = send_request(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["status"], "ready");
    let components = body["components"].as_array().unwrap();
    assert!(components.iter().all(|c| c["healthy"] == true));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let document: Value = read_json(response).await;
    assert!(document["paths"].get("/auth/login").is_some());
    assert!(document["paths"].get("/users/{id}").is_some());
}

#[tokio::test]
async fn rate_limit_trips_per_client() {
    let mut config = test_config();
    config.rate_limit.max_requests = 3;
    config.rate_limit.window_seconds = 60;
    let app = setup_test_app_with(config).await;

    let attempt = |forwarded: &'static str| {
        let app = &app;
        async move {
            let request = axum::http::Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header("content-type", "application/json")
                .header("x-forwarded-for", forwarded)
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "email": "nobody@example.com",
                        "password": "WrongPassword1!"
                    }))
                    .unwrap(),
                ))
                .unwrap();
            tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap()
        }
    };

    for _ in 0..3 {
        let response = attempt("203.0.113.7").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = attempt("203.0.113.7").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get("Retry-After").unwrap(), "60");

    // A different client is unaffected.
    let response = attempt("203.0.113.8").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
