//! In-process stand-in for the tenant API, used by tests.

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::types::PlatformConfig;

pub const TENANT: &str = "tenant-1";
pub const TOKEN: &str = "test-token";

#[derive(Debug)]
pub struct FakePlatform {
    pub services: Vec<Value>,
    pub definitions: HashMap<String, Value>,
    pub tasks: Vec<Value>,
    pub register_status: StatusCode,
    pub update_status: StatusCode,
    pub next_arn: String,
    pub registered: Vec<Value>,
    pub updated: Vec<Value>,
    pub unauthorized: usize,
}

impl Default for FakePlatform {
    fn default() -> Self {
        FakePlatform {
            services: Vec::new(),
            definitions: HashMap::new(),
            tasks: Vec::new(),
            register_status: StatusCode::OK,
            update_status: StatusCode::OK,
            next_arn: String::new(),
            registered: Vec::new(),
            updated: Vec::new(),
            unauthorized: 0,
        }
    }
}

type Shared = Arc<Mutex<FakePlatform>>;

async fn check_auth(state: &Shared, headers: &HeaderMap) {
    let expected = format!("Bearer {}", TOKEN);
    let ok = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !ok {
        state.lock().await.unauthorized += 1;
    }
}

async fn get_services(
    AxumState(state): AxumState<Shared>,
    Path(_tenant): Path<String>,
    headers: HeaderMap,
) -> Json<Vec<Value>> {
    check_auth(&state, &headers).await;
    Json(state.lock().await.services.clone())
}

async fn find_task_definition(
    AxumState(state): AxumState<Shared>,
    Path(_tenant): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    check_auth(&state, &headers).await;
    let arn = body["Arn"].as_str().unwrap_or_default().to_string();
    let found = state.lock().await.definitions.get(&arn).cloned();
    Json(found.unwrap_or(Value::Null))
}

async fn register_task_definition(
    AxumState(state): AxumState<Shared>,
    Path(_tenant): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    check_auth(&state, &headers).await;
    let mut guard = state.lock().await;
    guard.registered.push(body);
    (guard.register_status, Json(json!(guard.next_arn)))
}

async fn update_service(
    AxumState(state): AxumState<Shared>,
    Path(_tenant): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    check_auth(&state, &headers).await;
    let mut guard = state.lock().await;
    guard.updated.push(body);
    guard.update_status
}

async fn get_tasks(
    AxumState(state): AxumState<Shared>,
    Path(_tenant): Path<String>,
    headers: HeaderMap,
) -> Json<Vec<Value>> {
    check_auth(&state, &headers).await;
    Json(state.lock().await.tasks.clone())
}

/// Serves `platform` on an ephemeral local port and returns a config
/// pointing at it together with the shared state.
pub async fn serve(platform: FakePlatform) -> (PlatformConfig, Shared) {
    let shared = Arc::new(Mutex::new(platform));

    let app = Router::new()
        .route("/subscriptions/{tenant}/GetEcsServices", get(get_services))
        .route(
            "/subscriptions/{tenant}/FindEcsTaskDefinition",
            post(find_task_definition),
        )
        .route(
            "/subscriptions/{tenant}/UpdateEcsTaskDefinition",
            post(register_task_definition),
        )
        .route(
            "/subscriptions/{tenant}/UpdateEcsService",
            post(update_service),
        )
        .route("/subscriptions/{tenant}/GetEcsTasks", get(get_tasks))
        .with_state(shared.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = PlatformConfig::new(&format!("http://{}/", address), TENANT, TOKEN);
    (config, shared)
}
