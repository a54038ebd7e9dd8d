mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, TestApp, error_code, error_message};
use datapresenter::PresenterError;
use datapresenter::db::models::NewUser;
use serde_json::json;

#[tokio::test]
async fn register_login_and_me() {
    let t = TestApp::new(false).await;
    let token = t.register("measurement_fan").await;

    let me = t.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "measurement_fan");
    assert_eq!(me.body["email"], "measurement_fan@example.com");
    assert_eq!(me.body["token"], "");

    let login = t
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "measurement_fan", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(!login.body["token"].as_str().unwrap().is_empty());

    let user = t
        .storage
        .find_user_by_username("measurement_fan")
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let t = TestApp::new(true).await;
    t.register("measurement_fan").await;

    for body in [
        json!({ "username": "measurement_fan", "password": "not the password" }),
        json!({ "username": "nobody_at_all", "password": TEST_PASSWORD }),
        // seeded placeholder hash never verifies
        json!({ "username": "jan_kowalski", "password": TEST_PASSWORD }),
    ] {
        let resp = t.request("POST", "/api/auth/login", None, Some(body)).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&resp), "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn register_rejects_duplicates_and_invalid_input() {
    let t = TestApp::new(false).await;
    t.register("measurement_fan").await;

    let dup_name = t
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "measurement_fan",
                "email": "other@example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(dup_name.status, StatusCode::BAD_REQUEST);

    let dup_email = t
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "another_fan_here",
                "email": "MEASUREMENT_FAN@example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(dup_email.status, StatusCode::BAD_REQUEST);

    let short = t
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "shorty",
                "email": "shorty@example.com",
                "password": "tiny",
            })),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&short), "BAD_REQUEST");
}

#[tokio::test]
async fn change_password_flow() {
    let t = TestApp::new(false).await;
    let token = t.register("measurement_fan").await;

    let wrong = t
        .request(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "wrong guess", "newPassword": "fresh-secret" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let ok = t
        .request(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": TEST_PASSWORD, "newPassword": "fresh-secret" })),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert!(ok.body["message"].is_string());

    let old = t
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "measurement_fan", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = t
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "measurement_fan", "password": "fresh-secret" })),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let t = TestApp::new(true).await;

    let missing = t.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&missing), "UNAUTHORIZED");

    let garbage = t
        .request("GET", "/api/sensors", Some("not.a.jwt"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let create = t
        .request(
            "POST",
            "/api/series",
            None,
            Some(json!({ "name": "Noise", "minValue": 0, "maxValue": 140, "unit": "dB" })),
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_username_insert_is_a_client_error() {
    let t = TestApp::new(false).await;
    let user = || NewUser {
        username: "measurement_fan".into(),
        email: "fan@example.com".into(),
        password_hash: "$2b$04$placeholder".into(),
    };

    t.storage.insert_user(user()).await.unwrap();
    let second = t.storage.insert_user(user()).await;
    assert!(
        matches!(&second, Err(PresenterError::Validation(msg)) if msg == "Username already exists"),
        "{second:?}"
    );
}

#[tokio::test]
async fn concurrent_registrations_for_one_name_yield_one_account() {
    let t = TestApp::new(false).await;
    let body = || {
        Some(json!({
            "username": "measurement_fan",
            "email": "fan@example.com",
            "password": TEST_PASSWORD,
        }))
    };

    let (a, b) = tokio::join!(
        t.request("POST", "/api/auth/register", None, body()),
        t.request("POST", "/api/auth/register", None, body()),
    );
    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let loser = if a.status == StatusCode::OK { &b } else { &a };
    assert_eq!(error_code(loser), "BAD_REQUEST");
    assert_eq!(error_message(loser), "Username already exists");
}
