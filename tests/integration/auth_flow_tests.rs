use axum::http::{header, StatusCode};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use notes_backend_lib::auth::TokenCodec;
use notes_common::{ErrorBody, UserInfo};
use serde_json::json;
use tempfile::TempDir;

use crate::test_utils::{
    cookie_pair, read_json, send, set_cookie, setup_test_app, setup_test_app_with, test_settings,
    TEST_SECRET,
};

#[tokio::test]
async fn test_signup_login_and_protected_access() {
    let (app, _state, _temp_dir) = setup_test_app();
    let alice = json!({ "username": "alice", "password": "secret1" });

    // Sign up
    let response = send(&app, "POST", "/signup", None, Some(alice.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: UserInfo = read_json(response).await;
    assert_eq!(created.username, "alice");

    // Same name again, in any case
    let response = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({ "username": "Alice", "password": "another1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error.code, "AUTH_003");

    // Wrong password
    let response = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrongpass" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    // Correct password
    let response = send(&app, "POST", "/login", None, Some(alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let header_value = set_cookie(&response);
    assert!(header_value.starts_with("jwt="));
    assert!(header_value.contains("HttpOnly"));
    assert!(header_value.contains("Secure"));
    assert!(header_value.contains("SameSite=Lax"));
    assert!(header_value.contains("Expires="));
    let logged_in: UserInfo = read_json(response).await;
    assert_eq!(logged_in, created);

    // Protected route with the cookie
    let cookie = cookie_pair(&header_value);
    let response = send(&app, "GET", "/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me: UserInfo = read_json(response).await;
    assert_eq!(me, created);

    // Same request with the cookie value truncated by one character
    let truncated = &cookie[..cookie.len() - 1];
    let response = send(&app, "GET", "/me", Some(truncated), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error.code, "AUTH_001");

    // No cookie at all
    let response = send(&app, "GET", "/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_set_cookie_value_is_raw_base64url_token() {
    let (app, _state, _temp_dir) = setup_test_app();
    let codec = TokenCodec::new(TEST_SECRET.as_bytes());

    // Name lengths vary the token length, and so the amount of padding
    for name in ["bob", "carol", "dave_x", "erin.yy", "frank-zzz", "georgina_q"] {
        let credentials = json!({ "username": name, "password": "secret1" });
        send(&app, "POST", "/signup", None, Some(credentials.clone())).await;
        let response = send(&app, "POST", "/login", None, Some(credentials)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let header_value = set_cookie(&response);
        let value = cookie_pair(&header_value)
            .strip_prefix("jwt=")
            .unwrap()
            .to_string();
        assert!(!value.contains('%'), "{name}: {value}");
        assert!(header_value.len() <= notes_backend_lib::auth::MAX_COOKIE_BYTES);

        let token = String::from_utf8(URL_SAFE.decode(&value).unwrap()).unwrap();
        let claims = codec.parse(&token).unwrap();
        assert_eq!(claims.username.as_str(), name);

        // The raw value is accepted back on a protected route
        let response = send(&app, "GET", "/me", Some(&format!("jwt={value}")), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _state, _temp_dir) = setup_test_app();
    send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;

    let mut bodies = Vec::new();
    for (username, password) in [("alice", "wrongpass"), ("nobody", "secret1")] {
        let response = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = read_json(response).await;
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_unauthorized_responses_share_one_message() {
    let (app, state, _temp_dir) = setup_test_app();
    let forged = {
        let other = notes_backend_lib::auth::SessionService::new(
            &notes_backend_lib::config::SessionSettings {
                jwt_secret: "not-the-server-secret".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let identity = notes_backend_lib::auth::Identity::new(
            uuid::Uuid::new_v4(),
            notes_backend_lib::auth::Username::parse("mallory").unwrap(),
        );
        let cookie = other.create_session(&identity).unwrap();
        format!("{}={}", state.sessions.cookie_name(), cookie.value())
    };

    let mut messages = Vec::new();
    for cookie in [None, Some("jwt=%%%"), Some(forged.as_str())] {
        let response = send(&app, "GET", "/me", cookie, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = read_json(response).await;
        messages.push(body.error.message);
    }
    messages.dedup();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let (app, _state, _temp_dir) = setup_test_app();
    let cookie = crate::test_utils::login_as(&app, "alice", "secret1").await;

    let first = send(&app, "GET", "/logout", Some(&cookie), None).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    let first = set_cookie(&first);
    assert!(first.starts_with("jwt=;"));
    assert!(first.contains("1970"));

    // Logging out again, even without a session, yields the same cookie
    let second = send(&app, "GET", "/logout", None, None).await;
    assert_eq!(set_cookie(&second), first);
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let (app, _state, _temp_dir) = setup_test_app();

    let cases = [
        json!({ "username": "al", "password": "secret1" }),
        json!({ "username": "alice smith", "password": "secret1" }),
        json!({ "username": "alice", "password": "12345" }),
        json!({ "username": "alice", "password": "x".repeat(129) }),
        json!({ "username": "alice" }),
        json!({ "username": "alice", "password": "secret1", "admin": true }),
    ];
    for body in cases {
        let response = send(&app, "POST", "/signup", None, Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let error: ErrorBody = read_json(response).await;
        assert_eq!(error.error.code, "VAL_001");
    }
}

#[tokio::test]
async fn test_global_rate_limit_applies_to_all_routes() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = test_settings(&temp_dir);
    settings.rate_limit.capacity = 4;
    settings.rate_limit.refill_per_sec = 1;
    let (app, _state, _temp_dir) = setup_test_app_with(settings, temp_dir);

    for _ in 0..4 {
        let response = send(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Unauthenticated protected routes draw from the same bucket
    let response = send(&app, "GET", "/me", None, None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error.code, "RATE_001");
}

#[tokio::test]
async fn test_health() {
    let (app, _state, _temp_dir) = setup_test_app();
    let response = send(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let (app, _state, _temp_dir) = setup_test_app();
    let response = send(&app, "GET", "/no/such/route", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error.code, "NF_001");
}

#[tokio::test]
async fn test_truncated_credential_record_is_not_a_server_error() {
    let (app, _state, temp_dir) = setup_test_app();
    std::fs::write(temp_dir.path().join("users").join("alice.json"), "").unwrap();
    let alice = json!({ "username": "alice", "password": "secret1" });

    let response = send(&app, "POST", "/login", None, Some(alice.clone())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error.code, "AUTH_002");

    // The name stays taken
    let response = send(&app, "POST", "/signup", None, Some(alice)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
