//! End-to-end authentication flows driven through the router.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use userhub::storage::UserRepository;

use support::{
    access_token, login, read_json, refresh_token, register, send_request, setup_test_app, user_id,
};

#[tokio::test]
async fn register_returns_user_and_token_pair() {
    let app = setup_test_app().await;

    let body = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;

    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["role"], "user");
    // The public projection must never carry credential material.
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    assert_eq!(body["tokens"]["expiresIn"], 900);

    // The access token is immediately usable and bound to the new account.
    let claims = app.issuer.verify_access_token(&access_token(&body)).unwrap();
    assert_eq!(claims.sub, user_id(&body));
    assert_eq!(claims.email, "alice@example.com");
}

#[tokio::test]
async fn register_duplicate_email_is_conflict() {
    let app = setup_test_app().await;

    register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;

    // Same address with different casing still collides after normalization.
    let response = send_request(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "ALICE@Example.com", "password": "An0therPass!", "name": "Imposter" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let count = app.repository.count_users().await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn register_rejects_weak_input() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "bob@example.com", "password": "short", "name": "Bob" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_request(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "Sw0rdFish!", "name": "Bob" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_a_fresh_session() {
    let app = setup_test_app().await;
    let registered = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;

    let response = login(&app, "alice@example.com", "Sw0rdFish!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;

    assert_eq!(user_id(&body), user_id(&registered));

    // Every login gets its own token identifier.
    let first = app.issuer.verify_access_token(&access_token(&registered)).unwrap();
    let second = app.issuer.verify_access_token(&access_token(&body)).unwrap();
    assert_eq!(first.sub, second.sub);
    assert_ne!(first.jti, second.jti);
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let app = setup_test_app().await;
    register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;

    let wrong_password = login(&app, "alice@example.com", "WrongPassword1!").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = read_json(wrong_password).await;

    let unknown_email = login(&app, "nobody@example.com", "WrongPassword1!").await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: Value = read_json(unknown_email).await;

    // A wrong password and an unknown address produce the same body, so the
    // response cannot be used to probe which addresses are registered.
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn refresh_rotates_the_token_pair() {
    let app = setup_test_app().await;
    let registered = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let original_refresh = refresh_token(&registered);

    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": original_refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated: Value = read_json(response).await;
    let new_refresh = rotated["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, original_refresh);

    // The superseded token is dead.
    let replay = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": original_refresh })),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    // The replacement still works.
    let again = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": new_refresh })),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_garbage_token() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": "not-a-jwt" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_authenticated_user() {
    let app = setup_test_app().await;
    let body = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let token = access_token(&body);

    let response = send_request(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me: Value = read_json(response).await;
    assert_eq!(me["id"], body["user"]["id"]);
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = setup_test_app().await;

    let missing = send_request(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = send_request(&app, Method::GET, "/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = setup_test_app().await;
    let body = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let token = access_token(&body);

    let response = send_request(&app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The access token is rejected even though its signature and expiry are
    // still valid.
    let response = send_request(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The refresh token died with the session.
    let response = send_request(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh_token(&body) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_after_logout_starts_a_new_session() {
    let app = setup_test_app().await;
    let body = register(&app, "alice@example.com", "Sw0rdFish!", "Alice").await;
    let token = access_token(&body);

    send_request(&app, Method::POST, "/auth/logout", Some(&token), None).await;

    let response = login(&app, "alice@example.com", "Sw0rdFish!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let fresh: Value = read_json(response).await;
    let fresh_token = access_token(&fresh);

    let response = send_request(&app, Method::GET, "/auth/me", Some(&fresh_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
