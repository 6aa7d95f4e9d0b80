//! Contract tests: the real client against an in-process mock of the storefront API.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use client::{
    ApiClient, Cart, ClientError, FileTokenStore, MemoryTokenStore, SessionStore, TokenStore,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::models::{
    CreateOrderRequest, PaymentMethod, ProductForm, RegisterRequest, TokenRequest,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use url::Url;

#[derive(Default)]
struct Recorded {
    search_queries: Vec<String>,
    upload_fields: Vec<String>,
    upload_file_name: Option<String>,
    orders: Vec<Value>,
    me_headers: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Recorded>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

fn product_json(id: u64, name: &str, stock: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "description": "",
        "price": "12.50",
        "stock": stock,
        "image": null,
        "category": {"id": 1, "name": "Lighting", "slug": "lighting"},
        "supplier": {"id": 9, "username": "woodworks"}
    })
}

async fn obtain_token(Json(body): Json<TokenRequest>) -> Response {
    if body.username == "alice" && body.password == "secret" {
        Json(json!({"access": "tok-alice", "refresh": "ref-alice"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let header = bearer(&headers);
    state.lock().unwrap().me_headers.push(header.clone());
    if header.as_deref() != Some("Bearer tok-alice") {
        return unauthorized();
    }
    Json(json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "first_name": "Alice",
        "last_name": "Liddell",
        "is_staff": false,
        "is_superuser": false,
        "profile": {"role": "Client", "is_approved": true}
    }))
    .into_response()
}

async fn register(Json(body): Json<RegisterRequest>) -> Response {
    if body.password != body.password2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"password": ["Password fields didn't match."]})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"detail": "User registered successfully"})),
    )
        .into_response()
}

async fn list_products() -> Json<Value> {
    Json(json!([
        product_json(1, "Walnut Desk Lamp", 4),
        product_json(2, "Brass Floor Lamp", 0)
    ]))
}

async fn get_product(Path(id): Path<u64>) -> Response {
    if id == 1 {
        Json(product_json(1, "Walnut Desk Lamp", 4)).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
    }
}

async fn search(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let query = params.get("q").cloned().unwrap_or_default();
    state.lock().unwrap().search_queries.push(query);
    Json(json!([product_json(1, "Walnut Desk Lamp", 4)]))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name() {
            state.lock().unwrap().upload_file_name = Some(file_name.to_string());
        }
        let data = field.bytes().await.unwrap();
        state.lock().unwrap().upload_fields.push(name.clone());
        fields.insert(name, String::from_utf8_lossy(&data).into_owned());
    }
    if fields.get("name").map(String::as_str) == Some("Walnut Desk Lamp") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"name": ["product with this name already exists."]})),
        )
            .into_response();
    }
    let mut product = product_json(3, &fields["name"], fields["stock"].parse().unwrap());
    product["price"] = Value::String(fields["price"].clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    state.lock().unwrap().orders.push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 77,
            "user": {"id": 1, "username": "alice"},
            "created_at": "2025-03-01T10:00:00Z",
            "status": "Pending",
            "is_seen": false,
            "items": [],
            "total": "25.00"
        })),
    )
        .into_response()
}

async fn delete_user(Path(id): Path<u64>) -> StatusCode {
    if id == 1 {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn boom() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Server Error (500)</h1>")
}

async fn spawn_api() -> (Url, Shared) {
    let state = Shared::default();
    let api = Router::new()
        .route("/auth/token/", post(obtain_token))
        .route("/users/me/", get(me))
        .route("/users/register/", post(register))
        .route("/products/", get(list_products).post(create_product))
        .route("/products/search/", get(search))
        .route("/products/{id}/", get(get_product))
        .route("/create-order/", post(create_order))
        .route("/users/{id}/delete/", delete(delete_user))
        .route("/orders/", get(boom));
    let app = Router::new().nest("/api", api).with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{addr}/api/")).unwrap();
    (base, state)
}

fn client(base: Url) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_login_installs_bearer_for_identity_fetch() {
    let (base, state) = spawn_api().await;
    let api = client(base);
    let storage = Arc::new(MemoryTokenStore::new());
    let session = SessionStore::new(api.clone(), storage.clone());
    session.initialize().await.unwrap();
    assert!(state.lock().unwrap().me_headers.is_empty());

    let user = session.login("alice", "secret").await.unwrap();
    assert_eq!(user.username, "alice");
    assert!(api.is_authenticated());
    assert_eq!(
        state.lock().unwrap().me_headers,
        vec![Some("Bearer tok-alice".to_string())]
    );

    let stored = storage.load().unwrap().unwrap();
    assert_eq!(stored.access, "tok-alice");
    assert_eq!(stored.refresh.as_deref(), Some("ref-alice"));

    session.logout().unwrap();
    assert!(!api.is_authenticated());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn test_failed_login_leaves_no_token() {
    let (base, _state) = spawn_api().await;
    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    session.initialize().await.unwrap();

    let err = session.login("alice", "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert_eq!(
        err.body().and_then(|body| body.message()),
        Some("No active account found with the given credentials")
    );
    assert!(!api.is_authenticated());
    let snapshot = session.snapshot();
    assert!(snapshot.user.is_none());
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_session_restored_from_token_file() {
    let (base, _state) = spawn_api().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, r#"{"accessToken":"tok-alice","refreshToken":"ref-alice"}"#).unwrap();

    let api = client(base);
    let session = SessionStore::new(api, Arc::new(FileTokenStore::new(&path)));
    let snapshot = session.initialize().await.unwrap();
    assert_eq!(snapshot.user.unwrap().first_name, "Alice");
}

#[tokio::test]
async fn test_revoked_token_file_is_cleared() {
    let (base, _state) = spawn_api().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, r#"{"accessToken":"revoked","refreshToken":"r"}"#).unwrap();

    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(FileTokenStore::new(&path)));
    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthExpired));
    assert!(!path.exists());
    assert!(!api.is_authenticated());
}

#[tokio::test]
async fn test_register_mismatch_surfaces_field_error() {
    let (base, _state) = spawn_api().await;
    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    session.initialize().await.unwrap();

    let form = RegisterRequest {
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
        first_name: "Bob".to_string(),
        last_name: String::new(),
        password: "hunter22".to_string(),
        password2: "hunter23".to_string(),
    };
    let err = api.register(&form).await.unwrap_err();
    let ClientError::Validation { status, body } = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body.0, json!({"password": ["Password fields didn't match."]}));
    assert!(!api.is_authenticated());
    assert!(session.user().is_none());

    let ok = api
        .register(&RegisterRequest {
            password2: "hunter22".to_string(),
            ..form
        })
        .await
        .unwrap();
    assert_eq!(ok.detail, "User registered successfully");
}

#[tokio::test]
async fn test_search_sends_trimmed_query_and_skips_blank() {
    let (base, state) = spawn_api().await;
    let api = client(base);

    assert!(api.search_products("   ").await.unwrap().is_empty());
    let found = api.search_products("  desk lamp ").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].price, Decimal::new(1250, 2));
    assert_eq!(state.lock().unwrap().search_queries, vec!["desk lamp".to_string()]);
}

#[tokio::test]
async fn test_create_product_uploads_multipart_with_image() {
    let (base, state) = spawn_api().await;
    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    session.login("alice", "secret").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("lamp.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let form = ProductForm {
        name: "Oak Reading Lamp".to_string(),
        description: "Adjustable arm".to_string(),
        price: Decimal::new(3999, 2),
        stock: 6,
        category_id: 1,
        image: Some(image),
    };
    let product = api.create_product(&form).await.unwrap();
    assert_eq!(product.name, "Oak Reading Lamp");
    assert_eq!(product.price, Decimal::new(3999, 2));
    assert_eq!(product.stock, 6);

    let recorded = state.lock().unwrap();
    assert_eq!(
        recorded.upload_fields,
        vec!["name", "description", "price", "stock", "category_id", "image"]
    );
    assert_eq!(recorded.upload_file_name.as_deref(), Some("lamp.png"));
}

#[tokio::test]
async fn test_duplicate_product_name_is_validation_error() {
    let (base, _state) = spawn_api().await;
    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    session.login("alice", "secret").await.unwrap();

    let form = ProductForm {
        name: "Walnut Desk Lamp".to_string(),
        description: String::new(),
        price: Decimal::ONE,
        stock: 1,
        category_id: 1,
        image: None,
    };
    let err = api.create_product(&form).await.unwrap_err();
    assert_eq!(
        err.body().unwrap().field("name"),
        vec!["product with this name already exists."]
    );
}

#[tokio::test]
async fn test_checkout_posts_cart_lines() {
    let (base, state) = spawn_api().await;
    let api = client(base);
    let session = SessionStore::new(api.clone(), Arc::new(MemoryTokenStore::new()));
    session.login("alice", "secret").await.unwrap();

    let mut cart = Cart::new();
    for product in api.list_products().await.unwrap() {
        cart.add(product, 2);
    }
    let order = api
        .create_order(&CreateOrderRequest {
            items: cart.order_items(),
            address: "1 Loop Road".to_string(),
            payment_method: PaymentMethod::Cod,
        })
        .await
        .unwrap();
    assert_eq!(order.id, 77);

    let recorded = state.lock().unwrap();
    assert_eq!(
        recorded.orders,
        vec![json!({
            "items": [{"product_id": 1, "quantity": 2}],
            "address": "1 Loop Road",
            "payment_method": "cod"
        })]
    );
}

#[tokio::test]
async fn test_error_classification() {
    let (base, _state) = spawn_api().await;
    let api = client(base);

    let missing = api.get_product(9).await.unwrap_err();
    let ClientError::Unexpected { status, body } = &missing else {
        panic!("expected unexpected-status error, got {missing:?}");
    };
    assert_eq!(status.as_u16(), 404);
    assert_eq!(body.message(), Some("Not found."));

    let forbidden = api.delete_user(1).await.unwrap_err();
    assert!(forbidden.is_auth_failure());
    api.delete_user(2).await.unwrap();

    let server = api.list_orders().await.unwrap_err();
    assert_eq!(
        server.body().and_then(|body| body.message()),
        Some("<h1>Server Error (500)</h1>")
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(Url::parse(&format!("http://{addr}/api/")).unwrap());
    let err = api.list_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
