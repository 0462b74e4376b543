//! In-memory stand-in for the RT REST 2.0 endpoints the client consumes.
//!
//! Success codes follow the API as the client expects it: creates answer 201,
//! ticket updates 200, queue/asset/user updates 201, deletes 201, JSON
//! comments 201 and multipart comments 200.

pub mod store;

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

use store::{apply_changes, matches, parse_query, Store, Table};

pub use store::Record;

pub const SESSION_COOKIE: &str = "RT_SID";

pub type Db = Arc<RwLock<Store>>;

/// Credentials the server insists on. With neither set, every request is
/// accepted.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub token: Option<String>,
    pub login: Option<(String, String)>,
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            login: None,
        }
    }

    pub fn login(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            token: None,
            login: Some((user.into(), pass.into())),
        }
    }

    fn required(&self) -> bool {
        self.token.is_some() || self.login.is_some()
    }
}

#[derive(Clone)]
pub struct AppState {
    db: Db,
    credentials: Credentials,
    sessions: Arc<RwLock<HashSet<String>>>,
}

type Reply = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    failure(StatusCode::NOT_FOUND, "Resource does not exist")
}

/// Per-resource routing details.
trait Kind: Send + Sync + 'static {
    const PATH: &'static str;
    const LABEL: &'static str;
    const UPDATE_STATUS: StatusCode;

    fn table(store: &Store) -> &Table;
    fn table_mut(store: &mut Store) -> &mut Table;

    /// Reject a create payload; names must be present and unique.
    fn check_create(store: &Store, payload: &Map<String, Value>) -> Result<(), &'static str> {
        let name = payload.get("Name").and_then(Value::as_str).ok_or("Name is required")?;
        if Self::table(store).contains_name(name) {
            return Err("Name is already in use");
        }
        Ok(())
    }

    /// Field changes applied by DELETE.
    fn retire() -> Map<String, Value>;
}

struct Queues;
struct Tickets;
struct Assets;
struct Users;

impl Kind for Queues {
    const PATH: &'static str = "queue";
    const LABEL: &'static str = "Queue";
    const UPDATE_STATUS: StatusCode = StatusCode::CREATED;

    fn table(store: &Store) -> &Table {
        &store.queues
    }
    fn table_mut(store: &mut Store) -> &mut Table {
        &mut store.queues
    }
    fn retire() -> Map<String, Value> {
        Map::from_iter([("Disabled".to_string(), json!(1))])
    }
}

impl Kind for Tickets {
    const PATH: &'static str = "ticket";
    const LABEL: &'static str = "Ticket";
    const UPDATE_STATUS: StatusCode = StatusCode::OK;

    fn table(store: &Store) -> &Table {
        &store.tickets
    }
    fn table_mut(store: &mut Store) -> &mut Table {
        &mut store.tickets
    }
    fn check_create(store: &Store, payload: &Map<String, Value>) -> Result<(), &'static str> {
        let queue = payload.get("Queue").and_then(Value::as_str).ok_or("Queue is required")?;
        if store.queues.find(queue).is_none() {
            return Err("Invalid queue");
        }
        Ok(())
    }
    fn retire() -> Map<String, Value> {
        Map::from_iter([("Status".to_string(), json!("deleted"))])
    }
}

impl Kind for Assets {
    const PATH: &'static str = "asset";
    const LABEL: &'static str = "Asset";
    const UPDATE_STATUS: StatusCode = StatusCode::CREATED;

    fn table(store: &Store) -> &Table {
        &store.assets
    }
    fn table_mut(store: &mut Store) -> &mut Table {
        &mut store.assets
    }
    fn retire() -> Map<String, Value> {
        Map::from_iter([("Status".to_string(), json!("deleted"))])
    }
}

impl Kind for Users {
    const PATH: &'static str = "user";
    const LABEL: &'static str = "User";
    const UPDATE_STATUS: StatusCode = StatusCode::CREATED;

    fn table(store: &Store) -> &Table {
        &store.users
    }
    fn table_mut(store: &mut Store) -> &mut Table {
        &mut store.users
    }
    fn retire() -> Map<String, Value> {
        Map::from_iter([("Disabled".to_string(), json!(1))])
    }
}

/// Router without authentication.
pub fn app() -> Router {
    app_with(Credentials::default())
}

pub fn app_with(credentials: Credentials) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        credentials,
        sessions: Arc::new(RwLock::new(HashSet::new())),
    };

    let api = Router::new()
        .route("/queues/all", get(list_queues))
        .route("/queue", post(create_record::<Queues>))
        .route(
            "/queue/{id}",
            get(get_record::<Queues>)
                .put(update_record::<Queues>)
                .delete(delete_record::<Queues>),
        )
        .route("/queue/{id}/history", get(history::<Queues>))
        .route("/ticket", post(create_record::<Tickets>))
        .route(
            "/ticket/{id}",
            get(get_record::<Tickets>)
                .put(update_record::<Tickets>)
                .delete(delete_record::<Tickets>),
        )
        .route("/ticket/{id}/history", get(history::<Tickets>))
        .route("/ticket/{id}/comment", post(comment))
        .route("/tickets", get(search_tickets))
        .route("/asset", post(create_record::<Assets>))
        .route(
            "/asset/{id}",
            get(get_record::<Assets>)
                .put(update_record::<Assets>)
                .delete(delete_record::<Assets>),
        )
        .route("/user", post(create_record::<Users>))
        .route(
            "/user/{id}",
            get(get_record::<Users>)
                .put(update_record::<Users>)
                .delete(delete_record::<Users>),
        )
        .route("/user/{id}/history", get(history::<Users>))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", post(login))
        .nest("/REST/2.0", api)
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(credentials)).await
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginForm {
    user: String,
    pass: String,
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let accepted = match &state.credentials.login {
        Some((user, pass)) => *user == form.user && *pass == form.pass,
        None => !state.credentials.required(),
    };
    if !accepted {
        tracing::info!(user = %form.user, "login rejected");
        return failure(StatusCode::UNAUTHORIZED, "Login failed").into_response();
    }

    let sid = Uuid::new_v4().simple().to_string();
    state.sessions.write().await.insert(sid.clone());
    tracing::info!(user = %form.user, "login accepted");

    let mut response = (StatusCode::OK, "<html>logged in</html>").into_response();
    if let Ok(cookie) = HeaderValue::from_str(&format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly")) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.credentials.required() || authorized(&state, request.headers()).await {
        return next.run(request).await;
    }
    failure(StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    if let Some(token) = &state.credentials.token {
        let expected = format!("token {token}");
        if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str()) {
            return true;
        }
    }
    let sessions = state.sessions.read().await;
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == SESSION_COOKIE && sessions.contains(value))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn resource_url(headers: &HeaderMap, path: &str, id: u64) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/REST/2.0/{path}/{id}")
}

async fn list_queues(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let store = state.db.read().await;
    let items: Vec<Value> = store
        .queues
        .iter()
        .map(|q| json!({"id": q.id.to_string(), "type": "queue", "_url": resource_url(&headers, "queue", q.id)}))
        .collect();
    Json(json!({"count": items.len(), "total": items.len(), "page": 1, "items": items}))
}

async fn get_record<K: Kind>(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let store = state.db.read().await;
    let record = K::table(&store).find(&id).ok_or_else(not_found)?;
    Ok((StatusCode::OK, Json(record.to_json())))
}

async fn history<K: Kind>(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let store = state.db.read().await;
    let record = K::table(&store).find(&id).ok_or_else(not_found)?;
    let items = record.history.clone();
    Ok((StatusCode::OK, Json(json!({"count": items.len(), "page": 1, "items": items}))))
}

async fn create_record<K: Kind>(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Map<String, Value>>,
) -> Reply {
    let mut store = state.db.write().await;
    K::check_create(&store, &payload).map_err(|msg| failure(StatusCode::BAD_REQUEST, msg))?;
    let id = K::table_mut(&mut store).insert(payload);
    tracing::debug!(kind = K::PATH, id, "created");
    Ok((
        StatusCode::CREATED,
        Json(json!({"id": id, "type": K::PATH, "_url": resource_url(&headers, K::PATH, id)})),
    ))
}

async fn update_record<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Reply {
    let mut store = state.db.write().await;
    let record = K::table_mut(&mut store).find_mut(&id).ok_or_else(not_found)?;
    let messages = apply_changes(K::LABEL, record, payload);
    Ok((K::UPDATE_STATUS, Json(json!(messages))))
}

async fn delete_record<K: Kind>(State(state): State<AppState>, Path(id): Path<String>) -> Reply {
    let mut store = state.db.write().await;
    let record = K::table_mut(&mut store).find_mut(&id).ok_or_else(not_found)?;
    apply_changes(K::LABEL, record, K::retire());
    Ok((StatusCode::CREATED, Json(json!([format!("{} {} retired", K::LABEL, record.id)]))))
}

// ---------------------------------------------------------------------------
// Ticket extras
// ---------------------------------------------------------------------------

/// JSON bodies are comments (201); multipart bodies carry an attachment (200).
async fn comment(State(state): State<AppState>, Path(id): Path<String>, request: Request) -> Reply {
    let multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if state.db.read().await.tickets.find(&id).is_none() {
        return Err(not_found());
    }

    if multipart {
        let mut form = Multipart::from_request(request, &state)
            .await
            .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
        let mut attachment = None;
        let mut file = None;
        while let Some(field) = form
            .next_field()
            .await
            .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("Attachment") => {
                    attachment = Some(field.text().await.map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?);
                }
                Some("file") => {
                    let file_name = field.file_name().unwrap_or("unnamed").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
                    file = Some((file_name, bytes.len()));
                }
                _ => {}
            }
        }
        let (file_name, size) = file.ok_or_else(|| failure(StatusCode::BAD_REQUEST, "No file part"))?;
        let mut store = state.db.write().await;
        let ticket = store.tickets.find_mut(&id).ok_or_else(not_found)?;
        ticket.record(
            "AddAttachment",
            format!("{} ({size} bytes)", attachment.unwrap_or(file_name)),
        );
        return Ok((StatusCode::OK, Json(json!(["Attachment added"]))));
    }

    let Json(payload) = Json::<Map<String, Value>>::from_request(request, &state)
        .await
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
    let content = payload
        .get("Content")
        .and_then(Value::as_str)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Content is required"))?
        .to_string();
    let mut store = state.db.write().await;
    let ticket = store.tickets.find_mut(&id).ok_or_else(not_found)?;
    ticket.record("Comment", content);
    Ok((StatusCode::CREATED, Json(json!(["Comments added"]))))
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

async fn search_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Reply {
    let clauses = parse_query(&params.query).ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Wrong query"))?;
    let store = state.db.read().await;
    let items: Vec<Value> = store
        .tickets
        .iter()
        .filter(|t| matches(t, &clauses))
        .map(|t| json!({"id": t.id.to_string(), "type": "ticket", "_url": resource_url(&headers, "ticket", t.id)}))
        .collect();
    Ok((
        StatusCode::OK,
        Json(json!({"count": items.len(), "page": 1, "query": params.query, "items": items})),
    ))
}
