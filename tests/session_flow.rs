mod common;

use event_hub_lib::{ClientConfig, Credentials, EventStore, NoticeLevel, Profile, SessionStore};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use common::{config_for, event_json, store_for, user_json};

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_populates_memory_and_storage() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({ "email": "ada@example.com", "password": "secret" }));
            then.status(200).json_body(user_json("u1", "tok-1"));
        })
        .await;

    let (store, dir) = store_for(&server);
    let user = store
        .login(&credentials("ada@example.com", "secret"))
        .await
        .expect("login should succeed");

    login.assert_async().await;
    assert_eq!(user.id, "u1");
    assert_eq!(store.current_user(), Some(user.clone()));

    let persisted = SessionStore::restore(dir.path().join("current_user.json"));
    assert_eq!(persisted.current(), Some(user));
    assert_eq!(persisted.credential().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn failed_login_keeps_previous_session_and_reports_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .body_contains("ada@example.com");
            then.status(200).json_body(user_json("u1", "tok-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .body_contains("mallory@example.com");
            then.status(401)
                .json_body(json!({ "message": "Invalid credentials" }));
        })
        .await;

    let (store, dir) = store_for(&server);
    let mut notices = store.subscribe();
    let ada = store
        .login(&credentials("ada@example.com", "secret"))
        .await
        .expect("first login");

    let err = store
        .login(&credentials("mallory@example.com", "wrong"))
        .await
        .expect_err("bad credentials must fail");

    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert_eq!(store.current_user(), Some(ada.clone()));
    let persisted = SessionStore::restore(dir.path().join("current_user.json"));
    assert_eq!(persisted.current(), Some(ada));

    let notice = notices.try_recv().expect("error notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Invalid credentials");
}

#[tokio::test]
async fn failed_login_without_message_uses_fallback_and_stays_signed_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(500).body("internal error");
        })
        .await;

    let (store, dir) = store_for(&server);
    let mut notices = store.subscribe();
    assert!(store
        .login(&credentials("ada@example.com", "secret"))
        .await
        .is_err());

    assert!(store.current_user().is_none());
    assert!(!dir.path().join("current_user.json").exists());
    assert_eq!(notices.try_recv().expect("notice").message, "Login failed");
}

#[tokio::test]
async fn register_then_logout_round_trips_through_storage() {
    let server = MockServer::start_async().await;
    let register = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/register").json_body(json!({
                "name": "Grace",
                "email": "grace@example.com",
                "password": "hopper"
            }));
            then.status(201).json_body(user_json("u9", "tok-9"));
        })
        .await;

    let (store, dir) = store_for(&server);
    let user = store
        .register(&Profile {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: "hopper".to_string(),
        })
        .await
        .expect("register");
    register.assert_async().await;

    let restarted = EventStore::new(config_for(&server, &dir)).expect("store");
    assert_eq!(restarted.current_user(), Some(user));

    restarted.logout().expect("logout");
    assert!(restarted.current_user().is_none());
    assert!(!dir.path().join("current_user.json").exists());

    let after_logout = EventStore::new(config_for(&server, &dir)).expect("store");
    assert!(after_logout.current_user().is_none());
}

#[tokio::test]
async fn requests_carry_bearer_token_once_signed_in() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(user_json("u1", "tok-1"));
        })
        .await;
    let authed_list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/events")
                .header("authorization", "Bearer tok-1");
            then.status(200).json_body(json!([event_json("e1", "Rust Meetup")]));
        })
        .await;

    let (store, _dir) = store_for(&server);
    store
        .login(&credentials("ada@example.com", "secret"))
        .await
        .expect("login");
    store.refresh().await;

    authed_list.assert_async().await;
    assert_eq!(store.list().len(), 1);
}

#[tokio::test]
async fn corrupt_session_file_starts_signed_out() {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("current_user.json"), "][").expect("write");

    let config: ClientConfig = config_for(&server, &dir);
    let store = EventStore::new(config).expect("store");
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn failed_register_uses_fallback_and_keeps_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/events");
            then.status(200).json_body(json!([event_json("e1", "Rust Meetup")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/register");
            then.status(500).body("database down");
        })
        .await;

    let (store, dir) = store_for(&server);
    store.refresh().await;
    let before = store.list();
    let mut notices = store.subscribe();

    let err = store
        .register(&Profile {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: "hopper".to_string(),
        })
        .await
        .expect_err("register must fail");

    assert_eq!(err.user_message("Registration failed"), "Registration failed");
    assert_eq!(notices.try_recv().expect("notice").message, "Registration failed");
    assert!(store.current_user().is_none());
    assert!(!dir.path().join("current_user.json").exists());
    assert_eq!(store.list(), before);
}
