//! Integration tests for the `myecom` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use predicates::prelude::PredicateBooleanExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

fn myecom(tokens: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("myecom");
    cmd.env("MYECOM_TOKEN_PATH", tokens)
        .env_remove("MYECOM_API_URL")
        .env_remove("RUST_LOG")
        .timeout(std::time::Duration::from_secs(20));
    cmd
}

async fn token(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == "secret" {
        Json(json!({"access": "tok-alice", "refresh": "ref-alice"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(AUTHORIZATION)
        .is_some_and(|value| value == "Bearer tok-alice");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Given token not valid for any token type"})),
        )
            .into_response();
    }
    Json(json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "profile": {"role": "Client", "is_approved": true}
    }))
    .into_response()
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Walnut Desk Lamp", "price": "49.90", "stock": 4,
               "category": {"id": 2, "name": "Lighting", "slug": "lighting"}}),
        json!({"id": 2, "name": "Brass Floor Lamp", "price": "120.00", "stock": 0}),
        json!({"id": 3, "name": "Oak Shelf", "price": "15.00", "stock": 2}),
    ]
}

async fn products() -> Json<Value> {
    Json(Value::Array(catalog()))
}

async fn product(Path(id): Path<u64>) -> Response {
    match catalog().into_iter().find(|product| product["id"] == id) {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn spawn_api() -> String {
    let api = Router::new()
        .route("/auth/token/", post(token))
        .route("/users/me/", get(me))
        .route("/products/", get(products))
        .route("/products/{id}/", get(product));
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

#[test]
fn test_help_lists_command_groups() {
    let dir = TempDir::new().unwrap();
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicates::str::contains("session"))
        .stdout(predicates::str::contains("catalog"))
        .stdout(predicates::str::contains("checkout"))
        .stdout(predicates::str::contains("admin"));
}

#[test]
fn test_completion_script() {
    let dir = TempDir::new().unwrap();
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.args(["completion", "--shell", "bash"]);

    cmd.assert()
        .success()
        .stdout(predicates::str::contains("myecom"));
}

#[test]
fn test_config_generation() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("myecom.json");
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.args(["config", "--format", "json", "--output"]).arg(&output);

    cmd.assert()
        .success()
        .stdout(predicates::str::contains("generated successfully"));
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["api_origin"], "http://localhost:8000/");
    assert_eq!(written["request_timeout_secs"], 30);
}

#[test]
fn test_checkout_requires_items() {
    let dir = TempDir::new().unwrap();
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.args(["checkout", "--address", "1 Loop Road"]);

    cmd.assert()
        .failure()
        .stderr(predicates::str::contains(
            "the following required arguments were not provided",
        ))
        .stderr(predicates::str::contains("--item"));
}

#[test]
fn test_whoami_without_session() {
    let dir = TempDir::new().unwrap();
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.args(["session", "whoami"]);

    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("not logged in"));
}

#[test]
fn test_admin_commands_are_gated() {
    let dir = TempDir::new().unwrap();
    let mut cmd = myecom(&dir.path().join("tokens.json"));
    cmd.args(["admin", "users"]);

    cmd.assert().failure().stderr(
        predicates::str::contains("not logged in").and(predicates::str::contains("manage_users")),
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_catalog_list_against_api() {
    let origin = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let tokens = dir.path().join("tokens.json");

    tokio::task::spawn_blocking(move || {
        let mut cmd = myecom(&tokens);
        cmd.args(["--api-url", origin.as_str(), "catalog", "list"]);
        cmd.assert()
            .success()
            .stdout(predicates::str::contains("Walnut Desk Lamp"))
            .stdout(predicates::str::contains("49.90"))
            .stdout(predicates::str::contains("out of stock"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_whoami_logout() {
    let origin = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let tokens = dir.path().join("tokens.json");

    tokio::task::spawn_blocking(move || {
        myecom(&tokens)
            .args(["--api-url", origin.as_str(), "session", "login", "-u", "alice", "--password-stdin"])
            .write_stdin("wrong\n")
            .assert()
            .failure()
            .stderr(predicates::str::contains("login failed"));
        assert!(!tokens.exists());

        myecom(&tokens)
            .args(["--api-url", origin.as_str(), "session", "login", "-u", "alice", "--password-stdin"])
            .write_stdin("secret\n")
            .assert()
            .success()
            .stdout(predicates::str::contains("Logged in as alice"));
        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&tokens).unwrap()).unwrap();
        assert_eq!(stored["accessToken"], "tok-alice");
        assert_eq!(stored["refreshToken"], "ref-alice");

        myecom(&tokens)
            .args(["--api-url", origin.as_str(), "session", "whoami"])
            .assert()
            .success()
            .stdout(predicates::str::contains("alice (#1) <alice@example.com>"))
            .stdout(predicates::str::contains("capabilities: shop"));

        myecom(&tokens)
            .args(["--api-url", origin.as_str(), "session", "logout"])
            .assert()
            .success()
            .stdout(predicates::str::contains("Logged out"));
        assert!(!tokens.exists());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_revoked_stored_token_is_dropped() {
    let origin = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let tokens = dir.path().join("tokens.json");
    std::fs::write(&tokens, r#"{"accessToken":"revoked","refreshToken":"r"}"#).unwrap();

    tokio::task::spawn_blocking(move || {
        myecom(&tokens)
            .args(["--api-url", origin.as_str(), "session", "whoami"])
            .assert()
            .failure()
            .stderr(predicates::str::contains("no longer valid"))
            .stderr(predicates::str::contains("not logged in"));
        assert!(!tokens.exists());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_checkout_rechecks_live_stock() {
    let origin = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let tokens = dir.path().join("tokens.json");
    std::fs::write(&tokens, r#"{"accessToken":"tok-alice","refreshToken":"ref-alice"}"#).unwrap();

    tokio::task::spawn_blocking(move || {
        myecom(&tokens)
            .args([
                "--api-url",
                origin.as_str(),
                "checkout",
                "--item",
                "2",
                "--item",
                "3:5",
                "--address",
                "1 Loop Road",
                "--dry-run",
            ])
            .assert()
            .success()
            .stderr(predicates::str::contains(
                "Brass Floor Lamp is out of stock; skipped",
            ))
            .stderr(predicates::str::contains(
                "only 2 of Oak Shelf in stock; quantity reduced",
            ))
            .stdout(predicates::str::contains("2 x Oak Shelf"))
            .stdout(predicates::str::contains("2 item(s), total 30.00"))
            .stdout(predicates::str::contains("Brass").not());
    })
    .await
    .unwrap();
}
