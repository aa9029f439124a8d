mod common;

use emochat::config::AppConfig;
use emochat::routes::configure_routes;
use emochat::state::AppState;
use emochat::store::ChatStore;
use serde_json::{json, Value};
use testcontainers::clients::Cli;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "api-test-secret".to_string(),
        bcrypt_cost: 4,
        ..AppConfig::default()
    }
}

fn app(store: ChatStore) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone + 'static {
    configure_routes(AppState::new(store, &test_config()))
}

async fn call<F>(
    app: &F,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    F: Filter + Clone + Send + Sync + 'static,
    F::Extract: Reply + Send,
{
    let mut request = warp::test::request().method(method).path(path);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(app).await;
    let status = response.status();
    let value = if response.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(response.body()).expect("response is not JSON")
    };
    (status, value)
}

async fn signup<F>(app: &F, email: &str) -> String
where
    F: Filter + Clone + Send + Sync + 'static,
    F::Extract: Reply + Send,
{
    let (status, body) = call(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Sam", "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signup_login_and_verify() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;
    let app = app(store);

    let email = common::unique_email("Signup");
    let token = signup(&app, &email).await;

    // Same address in another case is still a duplicate
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Sam", "email": email.to_uppercase(), "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User with this email already exists");

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Sam", "email": common::unique_email("short"), "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("6 characters"));

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], email.to_lowercase());

    let (status, body) = call(&app, "GET", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email.to_lowercase());
}

#[tokio::test]
async fn test_conversation_lifecycle() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;
    let app = app(store);
    let token = signup(&app, &common::unique_email("life")).await;

    let (status, created) = call(&app, "POST", "/api/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "New Chat");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, saved) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages/bulk", id),
        Some(&token),
        Some(json!({ "messages": [
            { "role": "user", "content": "I feel lonely tonight" },
            { "role": "ai", "content": "I'm here with you." }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["messages"][0]["messageOrder"], 1);
    assert_eq!(saved["messages"][1]["messageOrder"], 2);

    let (status, single) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(&token),
        Some(json!({ "role": "user", "content": "thank you" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(single["messageOrder"], 3);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(&token),
        Some(json!({ "role": "robot", "content": "beep" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Role must be user, ai, or system");

    let (status, conversation) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation["title"], "I feel lonely tonight");
    assert_eq!(conversation["messages"].as_array().unwrap().len(), 3);

    let (status, list) = call(&app, "GET", "/api/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["messageCount"], 3);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/conversations/{}", id),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, renamed) = call(
        &app,
        "PUT",
        &format!("/api/conversations/{}", id),
        Some(&token),
        Some(json!({ "title": "A hard night" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["title"], "A hard night");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/conversations/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Conversation not found");
}

#[tokio::test]
async fn test_conversations_are_private() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;
    let app = app(store);

    let alice = signup(&app, &common::unique_email("alice")).await;
    let bob = signup(&app, &common::unique_email("bob")).await;

    let (_, created) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(&alice),
        Some(json!({ "title": "Diary" })),
    )
    .await;
    let path = format!("/api/conversations/{}", created["id"].as_str().unwrap());

    let (status, _) = call(&app, "GET", &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = call(&app, "GET", "/api/conversations", Some(&bob), None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = call(&app, "GET", &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_settings_roundtrip_and_health() {
    let docker = Cli::default();
    let container = docker.run(common::create_postgres_container());
    let store = common::connect_store(container.get_host_port_ipv4(common::POSTGRES_PORT)).await;
    let app = app(store);
    let token = signup(&app, &common::unique_email("settings")).await;

    let (status, settings) = call(&app, "GET", "/api/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings, json!({ "preferredModel": "gemini-pro", "useBuiltinKey": true }));

    let (status, settings) = call(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({ "useBuiltinKey": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["preferredModel"], "gemini-pro");
    assert_eq!(settings["useBuiltinKey"], false);

    let (status, health) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["database"], "connected");
}
