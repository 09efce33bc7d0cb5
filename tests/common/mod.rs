#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use safetnet_admin::auth::CredentialStore;
use safetnet_admin::client::ApiClient;
use safetnet_admin::config::ClientConfig;
use safetnet_admin::models::UserRecord;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const USER_COUNT: i64 = 5;
const USERS_PER_PAGE: i64 = 2;

#[derive(Default)]
struct MockState {
    base_url: String,
    requests: Vec<String>,
    bearer_tokens: Vec<Option<String>>,
    alerts: Vec<Value>,
    geofences: BTreeMap<i64, Value>,
    logout_calls: usize,
    logout_fails: bool,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the SafeTNet backend, one per test
pub struct MockBackend {
    pub base_url: String,
    state: Shared,
}

impl MockBackend {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(&self.base_url)
    }

    pub fn api(&self, store: CredentialStore) -> Result<ApiClient> {
        Ok(ApiClient::new(self.config(), store)?)
    }

    /// Method and path (with query) of every request received, in order
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().map(|s| s.requests.clone()).unwrap_or_default()
    }

    /// Bearer token sent with each request, None when the header was absent
    pub fn bearer_tokens(&self) -> Vec<Option<String>> {
        self.state.lock().map(|s| s.bearer_tokens.clone()).unwrap_or_default()
    }

    pub fn logout_calls(&self) -> usize {
        self.state.lock().map(|s| s.logout_calls).unwrap_or(0)
    }

    pub fn fail_logout(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.logout_fails = true;
        }
    }

    pub fn set_alerts(&self, alerts: Vec<Value>) {
        if let Ok(mut s) = self.state.lock() {
            s.alerts = alerts;
        }
    }
}

pub async fn spawn_backend() -> Result<MockBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut geofences = BTreeMap::new();
    geofences.insert(
        7,
        json!({
            "id": 7,
            "name": "North campus",
            "description": "Main gate to library",
            "active": true,
            "organization": 2,
            "polygon_json": {"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]},
            "radius_m": 250
        }),
    );

    let state: Shared = Arc::new(Mutex::new(MockState {
        base_url: base_url.clone(),
        geofences,
        ..MockState::default()
    }));

    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/refresh/", post(refresh))
        .route("/api/auth/logout/", post(logout))
        .route("/api/auth/profile/", get(profile))
        .route("/api/auth/admin/users/", get(list_users))
        .route("/api/auth/admin/users/:id/", get(get_user))
        .route("/api/auth/admin/alerts/", get(list_alerts).post(create_alert))
        .route("/api/auth/admin/alerts/:id/", get(missing))
        .route("/api/auth/admin/geofences/", get(list_geofences))
        .route(
            "/api/auth/admin/geofences/:id/",
            get(get_geofence).patch(patch_geofence).delete(delete_geofence),
        )
        .route("/api/auth/admin/incidents/", get(forbidden))
        .route("/api/auth/admin/notifications/", get(forbidden))
        .route("/api/auth/admin/organizations/", get(server_error))
        .route("/api/auth/admin/reports/", get(looping_reports))
        .route("/api/auth/admin/subadmins/", get(list_sub_admins))
        .route("/api/auth/admin/officers/", get(foreign_officers))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock backend")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend { base_url, state })
}

/// A signed-in user as the backend reports it
pub fn admin_user() -> UserRecord {
    serde_json::from_value(user_json(1)).expect("valid user")
}

/// Store already holding a session, as if `auth login` had run
pub fn signed_in_store() -> CredentialStore {
    let store = CredentialStore::in_memory();
    store.save("seeded-access", "seeded-refresh", &admin_user(), true);
    store
}

/// Store signed in as an organization's sub-admin
pub fn sub_admin_store() -> CredentialStore {
    let user: UserRecord = serde_json::from_value(json!({
        "id": 9,
        "username": "north-desk",
        "email": "north@safetnet.example",
        "role": "SUB_ADMIN"
    }))
    .expect("valid user");
    let store = CredentialStore::in_memory();
    store.save("seeded-access", "seeded-refresh", &user, true);
    store
}

fn user_json(id: i64) -> Value {
    let (username, role) = if id == 1 {
        (USERNAME.to_string(), "SUPER_ADMIN")
    } else {
        (format!("user{}", id), "USER")
    };
    json!({
        "id": id,
        "username": username,
        "email": format!("user{}@safetnet.example", id),
        "role": role,
        "is_active": id % 2 == 1,
        "date_joined": format!("2024-03-0{}T10:00:00Z", id)
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Log the request; Err when no bearer token was sent
fn record(state: &Shared, method: &str, uri: &Uri, headers: &HeaderMap) -> Result<(), Response> {
    let token = bearer(headers);
    if let Ok(mut s) = state.lock() {
        s.requests.push(format!("{} {}", method, uri));
        s.bearer_tokens.push(token.clone());
    }
    match token {
        Some(_) => Ok(()),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response()),
    }
}

fn record_public(state: &Shared, method: &str, uri: &Uri, headers: &HeaderMap) {
    if let Ok(mut s) = state.lock() {
        s.requests.push(format!("{} {}", method, uri));
        s.bearer_tokens.push(bearer(headers));
    }
}

async fn login(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_public(&state, "POST", &uri, &headers);
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({
            "access": "access-1",
            "refresh": "refresh-1",
            "user": user_json(1)
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid credentials"}))).into_response()
    }
}

async fn refresh(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_public(&state, "POST", &uri, &headers);
    match body["refresh"].as_str() {
        Some("refresh-1") | Some("seeded-refresh") => {
            Json(json!({"access": "access-2"})).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response(),
    }
}

async fn logout(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    record_public(&state, "POST", &uri, &headers);
    let fails = match state.lock() {
        Ok(mut s) => {
            s.logout_calls += 1;
            s.logout_fails
        }
        Err(_) => false,
    };
    if fails {
        (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
    } else {
        StatusCode::RESET_CONTENT.into_response()
    }
}

async fn profile(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    Json(user_json(1)).into_response()
}

async fn list_users(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    let base_url = state.lock().map(|s| s.base_url.clone()).unwrap_or_default();
    let page: i64 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

    let first = (page - 1) * USERS_PER_PAGE + 1;
    let last = (first + USERS_PER_PAGE - 1).min(USER_COUNT);
    let results: Vec<Value> = (first..=last).map(user_json).collect();

    // Page 2 links with an absolute URL, page 3 with a relative one
    let next = match page {
        1 => json!(format!("{}/api/auth/admin/users/?page=2", base_url)),
        2 => json!("/api/auth/admin/users/?page=3"),
        _ => Value::Null,
    };

    Json(json!({
        "count": USER_COUNT,
        "next": next,
        "previous": null,
        "results": results
    }))
    .into_response()
}

async fn get_user(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    if (1..=USER_COUNT).contains(&id) {
        Json(user_json(id)).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
    }
}

async fn list_alerts(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    let alerts = state.lock().map(|s| s.alerts.clone()).unwrap_or_default();
    Json(Value::Array(alerts)).into_response()
}

async fn create_alert(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = record(&state, "POST", &uri, &headers) {
        return resp;
    }
    if body.get("title").and_then(Value::as_str).is_none() {
        let errors = json!({"title": ["This field is required."]});
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    let mut alert = body;
    if let Ok(mut s) = state.lock() {
        alert["id"] = json!(s.alerts.len() as i64 + 100);
        s.alerts.push(alert.clone());
    }
    (StatusCode::CREATED, Json(alert)).into_response()
}

async fn missing(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

async fn list_geofences(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    let geofences: Vec<Value> = state
        .lock()
        .map(|s| s.geofences.values().cloned().collect())
        .unwrap_or_default();
    Json(Value::Array(geofences)).into_response()
}

async fn get_geofence(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    let found = state.lock().ok().and_then(|s| s.geofences.get(&id).cloned());
    match found {
        Some(geofence) => Json(geofence).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn patch_geofence(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = record(&state, "PATCH", &uri, &headers) {
        return resp;
    }
    let mut guard = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let Some(geofence) = guard.geofences.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    };
    if let (Some(target), Some(fields)) = (geofence.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(geofence.clone()).into_response()
}

async fn delete_geofence(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = record(&state, "DELETE", &uri, &headers) {
        return resp;
    }
    let removed = state.lock().ok().and_then(|mut s| s.geofences.remove(&id));
    match removed {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

async fn forbidden(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "You do not have permission to perform this action."})),
    )
        .into_response()
}

async fn server_error(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Server Error (500)</h1>").into_response()
}

/// A broken paginator whose `next` points back at itself
async fn looping_reports(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    Json(json!({
        "next": "/api/auth/admin/reports/",
        "results": [{"id": 1, "title": "Weekly summary"}]
    }))
    .into_response()
}

/// Sub-admin rows, the second one with nulls where the backend left fields blank
async fn list_sub_admins(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    Json(json!([
        {
            "id": 1,
            "username": "north-desk",
            "email": "north@safetnet.example",
            "organization": 2,
            "is_active": true
        },
        {
            "id": 2,
            "username": "south-desk",
            "email": null,
            "first_name": null,
            "organization": null,
            "is_active": null,
            "date_joined": null
        }
    ]))
    .into_response()
}

/// First page links to a different host
async fn foreign_officers(State(state): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(resp) = record(&state, "GET", &uri, &headers) {
        return resp;
    }
    Json(json!({
        "next": "http://collector.invalid/api/auth/admin/officers/?page=2",
        "results": [{"id": 1, "name": "Officer Diaz", "is_active": true}]
    }))
    .into_response()
}
