//! In-process stand-in for the repair-service REST API.
//!
//! It enforces the lifecycle through `repair_desk::lifecycle` the way the
//! real backend re-validates every transition, and exposes knobs to expire
//! tokens, revoke refresh credentials, slow refreshes down and change stock.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{header::SET_COOKIE, request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Form, Json, RequestPartsExt as _, Router,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization, Cookie};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tokio::net::TcpListener;

use repair_desk::{
    api::{
        component, notification, repair_request,
        user::{self, Role},
        Component, Notification, RepairRequest, User,
    },
    config,
    lifecycle::{self, Inventory, Personalization, Status, Step},
    session::{MemoryStore, Store},
    Client,
};

pub const PASSWORD: &str = "password";

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const CAROL: &str = "carol@example.com";
pub const DAVE: &str = "dave@example.com";
pub const ERIN: &str = "erin@example.com";
pub const FRANK: &str = "frank@example.com";

#[derive(Clone)]
pub struct Backend {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

struct Shared {
    db: Mutex<Db>,
    refresh_calls: AtomicUsize,
    refresh_delay: Mutex<Duration>,
    reject_me: AtomicBool,
}

struct Db {
    users: Vec<(User, String)>,
    access_tokens: HashMap<String, user::Id>,
    refresh_tokens: HashMap<String, user::Id>,
    links: HashMap<String, user::Id>,
    requests: Vec<RepairRequest>,
    components: Vec<Component>,
    notifications: Vec<(user::Id, Notification)>,
    next_id: i64,
}

impl Db {
    fn seeded() -> Self {
        let users = [
            (1, "Alice", ALICE, Role::User),
            (2, "Bob", BOB, Role::Manager),
            (3, "Carol", CAROL, Role::Master),
            (4, "Dave", DAVE, Role::Master),
            (5, "Erin", ERIN, Role::User),
            (6, "Frank", FRANK, Role::Manager),
        ]
        .into_iter()
        .map(|(id, name, email, role)| {
            let user = User {
                id: user::Id::from(id),
                first_name: Some(name.to_owned()),
                last_name: None,
                email: email.to_owned(),
                role,
            };
            (user, PASSWORD.to_owned())
        })
        .collect();

        let components = [
            (1, "SSD 512GB", 4, 450_000.0),
            (2, "RAM 16GB", 0, 380_000.0),
            (3, "Thermal paste", 5, 30_000.0),
        ]
        .into_iter()
        .map(|(id, name, in_stock, price)| Component {
            id: component::Id::from(id),
            name: name.to_owned(),
            description: None,
            in_stock,
            price: Some(price),
        })
        .collect();

        Self {
            users,
            access_tokens: HashMap::new(),
            refresh_tokens: HashMap::new(),
            links: HashMap::new(),
            requests: Vec::new(),
            components,
            notifications: Vec::new(),
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue(&mut self, kind: &str, user: user::Id) -> String {
        let token = format!("{kind}-{user}-{}", self.next_id());
        match kind {
            "access" => self.access_tokens.insert(token.clone(), user),
            _ => self.refresh_tokens.insert(token.clone(), user),
        };
        token
    }

    fn user(&self, id: user::Id) -> Option<User> {
        self.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone())
    }

    fn notify(
        &mut self,
        receiver: user::Id,
        title: String,
        message: String,
    ) -> Notification {
        let notification = Notification {
            id: notification::Id::from(self.next_id()),
            title,
            message,
            created_at: Some(OffsetDateTime::now_utc()),
            seen: false,
        };
        self.notifications.push((receiver, notification.clone()));
        notification
    }
}

impl Backend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend = Self {
            addr: listener.local_addr().unwrap(),
            shared: Arc::new(Shared {
                db: Mutex::new(Db::seeded()),
                refresh_calls: AtomicUsize::new(0),
                refresh_delay: Mutex::new(Duration::ZERO),
                reject_me: AtomicBool::new(false),
            }),
        };

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh-token", post(refresh_token))
            .route("/auth/logout", post(logout))
            .route("/auth/me", get(me))
            .route("/auth/send-auth-link", post(send_auth_link))
            .route("/auth/verify/:token", post(verify))
            .route("/auth/register", post(register))
            .route(
                "/repair-requests",
                get(list_requests).post(create_request),
            )
            .route("/repair-requests/me", get(my_requests))
            .route("/repair-requests/master", get(assigned_requests))
            .route("/repair-requests/:id", get(get_request))
            .route("/repair-requests/:id/as-checked", post(as_checked))
            .route("/repair-requests/:id/as-rejected", post(as_rejected))
            .route(
                "/repair-requests/:id/personalize-order",
                patch(personalize_order),
            )
            .route(
                "/repair-requests/:id/as-in-progress",
                post(as_in_progress),
            )
            .route("/repair-requests/:id/as-completed", patch(as_completed))
            .route("/components", get(list_components).post(add_component))
            .route("/components/:id", patch(update_component))
            .route("/users", get(list_users).post(create_user))
            .route("/users/:id", patch(update_user_role))
            .route(
                "/notifications",
                get(list_notifications).post(send_notification),
            )
            .route("/notifications/as-read", post(mark_read));
        let app = Router::new()
            .nest("/api", api)
            .with_state(backend.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        backend
    }

    pub fn api_config(&self) -> config::Api {
        config::Api {
            base_url: format!("http://{}/api", self.addr),
            connect_timeout: None,
        }
    }

    pub async fn client(&self) -> Client {
        self.client_with(MemoryStore::default()).await
    }

    pub async fn client_with(&self, store: impl Store + 'static) -> Client {
        Client::new(&self.api_config(), store).await.unwrap()
    }

    /// Client signed in as `email`.
    pub async fn login(&self, email: &str) -> Client {
        let client = self.client().await;
        client.login(email, PASSWORD).await.unwrap();
        client
    }

    fn db(&self) -> MutexGuard<'_, Db> {
        self.shared.db.lock().unwrap()
    }

    pub fn refresh_calls(&self) -> usize {
        self.shared.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.shared.refresh_delay.lock().unwrap() = delay;
    }

    /// Makes `/auth/me` answer 401 whatever token it gets.
    pub fn reject_me(&self) {
        self.shared.reject_me.store(true, Ordering::SeqCst);
    }

    /// Invalidates every issued access token.
    pub fn expire_access_tokens(&self) {
        self.db().access_tokens.clear();
    }

    /// Invalidates every issued refresh credential.
    pub fn revoke_refresh_tokens(&self) {
        self.db().refresh_tokens.clear();
    }

    pub fn set_stock(&self, id: i64, in_stock: u32) {
        let mut db = self.db();
        if let Some(c) =
            db.components.iter_mut().find(|c| c.id == component::Id::from(id))
        {
            c.in_stock = in_stock;
        }
    }

    pub fn stock(&self, id: i64) -> u32 {
        self.db()
            .components
            .iter()
            .find(|c| c.id == component::Id::from(id))
            .map(|c| c.in_stock)
            .unwrap()
    }

    pub fn status(&self, id: repair_request::Id) -> Status {
        self.db()
            .requests
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
            .unwrap()
    }

    /// Token of the last sign-in link e-mailed to `email`.
    pub fn link_for(&self, email: &str) -> Option<String> {
        let db = self.db();
        let user = db.users.iter().find(|(u, _)| u.email == email)?.0.id;
        db.links
            .iter()
            .filter(|(_, id)| **id == user)
            .map(|(token, _)| token.clone())
            .max()
    }
}

/// Repair request as submitted by Alice in most tests.
pub fn laptop() -> repair_request::New {
    repair_request::New {
        device_model: "ThinkPad T14".to_owned(),
        issue_type: repair_request::IssueType::Hardware,
        problem_area: "keyboard".to_owned(),
        description: "Several keys stopped working".to_owned(),
        location: "Tashkent".to_owned(),
    }
}

/// Personalization that is valid against the seeded inventory.
pub fn offer(components: Vec<(i64, u32)>) -> Personalization {
    Personalization {
        price: 150_000.0,
        end_date: OffsetDateTime::now_utc() + time::Duration::days(3),
        components: components
            .into_iter()
            .map(|(id, quantity)| component::Allocation {
                id: id.into(),
                quantity,
            })
            .collect(),
    }
}

/// Temporary directory unique to one test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "repair-desk-{name}-{}-{}",
        std::process::id(),
        OffsetDateTime::now_utc().unix_timestamp_nanos(),
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    fn not_found(id: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("RepairRequest ID {id} not found"),
        )
    }
}

impl From<lifecycle::Error> for ApiError {
    fn from(e: lifecycle::Error) -> Self {
        use lifecycle::Error as E;

        let status = match &e {
            E::WrongRole { .. } | E::NotOwner(_) | E::NotAssignedMaster(_) => {
                StatusCode::FORBIDDEN
            }
            E::InvalidTransition { .. } | E::InsufficientStock { .. } => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "detail": { "status": "error", "message": self.detail },
        });
        (self.status, Json(body)).into_response()
    }
}

struct Caller(User);

#[async_trait]
impl FromRequestParts<Backend> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut request::Parts,
        backend: &Backend,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::unauthorized())?;
        let db = backend.db();
        db.access_tokens
            .get(bearer.token())
            .and_then(|id| db.user(*id))
            .map(Caller)
            .ok_or_else(ApiError::unauthorized)
    }
}

fn with_refresh_cookie(token: &str, body: serde_json::Value) -> Response {
    (
        [(SET_COOKIE, format!("refresh_token={token}; HttpOnly; Path=/"))],
        Json(body),
    )
        .into_response()
}

#[derive(Deserialize)]
struct LoginInput {
    username: String,
    password: String,
}

async fn login(
    State(backend): State<Backend>,
    Form(LoginInput { username, password }): Form<LoginInput>,
) -> Result<Response, ApiError> {
    let mut db = backend.db();
    let user = db
        .users
        .iter()
        .find(|(u, p)| u.email == username && *p == password)
        .map(|(u, _)| u.id)
        .ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "Email yoki parol xato")
        })?;
    let access = db.issue("access", user);
    let refresh = db.issue("refresh", user);
    Ok(with_refresh_cookie(&refresh, json!({ "access_token": access })))
}

async fn refresh_token(
    State(backend): State<Backend>,
    cookie: Option<TypedHeader<Cookie>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    backend.shared.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.shared.refresh_delay.lock().unwrap();
    tokio::time::sleep(delay).await;

    let mut db = backend.db();
    let user = cookie
        .as_ref()
        .and_then(|TypedHeader(c)| c.get("refresh_token"))
        .and_then(|t| db.refresh_tokens.get(t).copied())
        .ok_or_else(ApiError::unauthorized)?;
    let access = db.issue("access", user);
    Ok(Json(json!({ "access_token": access })))
}

async fn logout(
    State(backend): State<Backend>,
    cookie: Option<TypedHeader<Cookie>>,
) -> Json<serde_json::Value> {
    if let Some(token) =
        cookie.as_ref().and_then(|TypedHeader(c)| c.get("refresh_token"))
    {
        backend.db().refresh_tokens.remove(token);
    }
    Json(json!({ "message": "Muvaffaqiyatli chiqdingiz" }))
}

async fn me(
    State(backend): State<Backend>,
    Caller(user): Caller,
) -> Result<Json<User>, ApiError> {
    if backend.shared.reject_me.load(Ordering::SeqCst) {
        return Err(ApiError::unauthorized());
    }
    Ok(Json(user))
}

#[derive(Deserialize)]
struct SendLinkInput {
    email: String,
}

async fn send_auth_link(
    State(backend): State<Backend>,
    Form(SendLinkInput { email }): Form<SendLinkInput>,
) -> Json<serde_json::Value> {
    let mut db = backend.db();
    let existing = db
        .users
        .iter()
        .find(|(u, _)| u.email == email)
        .map(|(u, _)| u.id);
    let user = match existing {
        Some(id) => id,
        None => {
            let id = user::Id::from(db.next_id());
            let user = User {
                id,
                first_name: None,
                last_name: None,
                email,
                role: Role::User,
            };
            db.users.push((user, String::new()));
            id
        }
    };
    let token = format!("link-{}", db.next_id());
    db.links.insert(token, user);
    Json(json!({ "status": "success" }))
}

async fn verify(
    State(backend): State<Backend>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let mut db = backend.db();
    let user = db
        .links
        .remove(&token)
        .ok_or_else(|| {
            ApiError::new(StatusCode::UNAUTHORIZED, "Token yaroqsiz")
        })?;
    let refresh = db.issue("refresh", user);
    Ok(with_refresh_cookie(&refresh, json!({ "status": "success" })))
}

#[derive(Deserialize)]
struct RegisterInput {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    role: Option<Role>,
}

async fn register(
    State(backend): State<Backend>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut db = backend.db();
    if db.users.iter().any(|(u, _)| u.email == input.email) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Ushbu email bilan user allaqachon mavjud",
        ));
    }
    let id = user::Id::from(db.next_id());
    let user = User {
        id,
        first_name: Some(input.first_name),
        last_name: Some(input.last_name),
        email: input.email,
        role: input.role.unwrap_or(Role::User),
    };
    db.users.push((user, input.password));
    Ok(Json(json!({ "status": "success" })))
}

async fn create_request(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Json(new): Json<repair_request::New>,
) -> Result<Json<RepairRequest>, ApiError> {
    if user.role != Role::User {
        return Err(ApiError::forbidden());
    }
    let mut db = backend.db();
    let request = RepairRequest {
        id: repair_request::Id::from(db.next_id()),
        owner: user,
        master: None,
        device_model: new.device_model,
        issue_type: new.issue_type,
        problem_area: new.problem_area,
        description: new.description,
        location: Some(new.location),
        price: None,
        end_time: None,
        components: Vec::new(),
        status: Status::Created,
        created_at: OffsetDateTime::now_utc(),
    };
    db.requests.push(request.clone());
    Ok(Json(request))
}

#[derive(Deserialize)]
struct ListInput {
    status: Option<Status>,
}

async fn list_requests(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Query(ListInput { status }): Query<ListInput>,
) -> Result<Json<Vec<RepairRequest>>, ApiError> {
    if user.role == Role::User {
        return Err(ApiError::forbidden());
    }
    let requests = backend
        .db()
        .requests
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .cloned()
        .collect();
    Ok(Json(requests))
}

async fn my_requests(
    State(backend): State<Backend>,
    Caller(user): Caller,
) -> Json<Vec<RepairRequest>> {
    let requests = backend
        .db()
        .requests
        .iter()
        .filter(|r| r.owner.id == user.id)
        .cloned()
        .collect();
    Json(requests)
}

async fn assigned_requests(
    State(backend): State<Backend>,
    Caller(user): Caller,
) -> Result<Json<Vec<RepairRequest>>, ApiError> {
    if user.role != Role::Master {
        return Err(ApiError::forbidden());
    }
    let requests = backend
        .db()
        .requests
        .iter()
        .filter(|r| r.master.as_ref().is_some_and(|m| m.id == user.id))
        .cloned()
        .collect();
    Ok(Json(requests))
}

async fn get_request(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
) -> Result<Json<RepairRequest>, ApiError> {
    if user.role == Role::User {
        return Err(ApiError::forbidden());
    }
    backend
        .db()
        .requests
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(id))
}

fn advance(
    backend: &Backend,
    actor: &User,
    id: repair_request::Id,
    step: Step,
) -> Result<Json<RepairRequest>, ApiError> {
    let mut db = backend.db();

    let allocations = match &step {
        Step::Personalize(p) => p.components.clone(),
        _ => Vec::new(),
    };
    Inventory::new(db.components.clone()).check(&allocations)?;

    let request = db
        .requests
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| ApiError::not_found(id))?;
    lifecycle::apply(request, step, actor, OffsetDateTime::now_utc())?;
    let updated = request.clone();

    for a in &allocations {
        if let Some(c) = db.components.iter_mut().find(|c| c.id == a.id) {
            c.in_stock -= a.quantity;
        }
    }
    db.notify(
        updated.owner.id,
        format!("Repair request {id}"),
        format!("Status changed to {}", updated.status),
    );

    Ok(Json(updated))
}

async fn as_checked(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
) -> Result<Json<RepairRequest>, ApiError> {
    advance(&backend, &user, id, Step::Check)
}

async fn as_rejected(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
) -> Result<Json<RepairRequest>, ApiError> {
    advance(&backend, &user, id, Step::Reject)
}

async fn personalize_order(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
    Json(personalization): Json<Personalization>,
) -> Result<Json<RepairRequest>, ApiError> {
    advance(&backend, &user, id, Step::Personalize(personalization))
}

async fn as_in_progress(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
) -> Result<Json<RepairRequest>, ApiError> {
    advance(&backend, &user, id, Step::Start)
}

async fn as_completed(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Path(id): Path<repair_request::Id>,
) -> Result<Json<RepairRequest>, ApiError> {
    advance(&backend, &user, id, Step::Complete)
}

async fn list_components(
    State(backend): State<Backend>,
    _: Caller,
) -> Json<Vec<Component>> {
    Json(backend.db().components.clone())
}

async fn add_component(
    State(backend): State<Backend>,
    _: Caller,
    Json(new): Json<component::New>,
) -> Json<Component> {
    let mut db = backend.db();
    let component = Component {
        id: component::Id::from(db.next_id()),
        name: new.name,
        description: new.description,
        in_stock: new.in_stock,
        price: new.price,
    };
    db.components.push(component.clone());
    Json(component)
}

async fn update_component(
    State(backend): State<Backend>,
    _: Caller,
    Path(id): Path<component::Id>,
    Json(update): Json<component::Update>,
) -> Result<Json<Component>, ApiError> {
    let mut db = backend.db();
    let component = db
        .components
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "Komponent topilmadi")
        })?;
    if let Some(name) = update.name {
        component.name = name;
    }
    if let Some(description) = update.description {
        component.description = Some(description);
    }
    if let Some(in_stock) = update.in_stock {
        component.in_stock = in_stock;
    }
    if let Some(price) = update.price {
        component.price = Some(price);
    }
    Ok(Json(component.clone()))
}

async fn list_notifications(
    State(backend): State<Backend>,
    Caller(user): Caller,
) -> Json<Vec<Notification>> {
    let notifications = backend
        .db()
        .notifications
        .iter()
        .filter(|(receiver, _)| *receiver == user.id)
        .map(|(_, n)| n.clone())
        .collect();
    Json(notifications)
}

async fn mark_read(
    State(backend): State<Backend>,
    Caller(user): Caller,
    Json(ids): Json<Vec<notification::Id>>,
) -> Json<serde_json::Value> {
    let mut db = backend.db();
    for (_, n) in db
        .notifications
        .iter_mut()
        .filter(|(receiver, n)| *receiver == user.id && ids.contains(&n.id))
    {
        n.seen = true;
    }
    Json(json!({ "status": "success" }))
}

#[derive(Deserialize)]
struct RoleInput {
    role: Option<Role>,
}

async fn list_users(
    State(backend): State<Backend>,
    Caller(caller): Caller,
    Query(RoleInput { role }): Query<RoleInput>,
) -> Result<Json<Vec<User>>, ApiError> {
    if caller.role != Role::Manager {
        return Err(ApiError::forbidden());
    }
    let users = backend
        .db()
        .users
        .iter()
        .map(|(u, _)| u)
        .filter(|u| role.map_or(true, |r| u.role == r))
        .cloned()
        .collect();
    Ok(Json(users))
}

async fn create_user(
    State(backend): State<Backend>,
    Caller(caller): Caller,
    Json(input): Json<RegisterInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if caller.role != Role::Manager {
        return Err(ApiError::forbidden());
    }
    register(State(backend), Json(input)).await
}

async fn update_user_role(
    State(backend): State<Backend>,
    Caller(caller): Caller,
    Path(id): Path<user::Id>,
    Query(RoleInput { role }): Query<RoleInput>,
) -> Result<Json<User>, ApiError> {
    if caller.role != Role::Manager {
        return Err(ApiError::forbidden());
    }
    let mut db = backend.db();
    let (user, _) = db
        .users
        .iter_mut()
        .find(|(u, _)| u.id == id)
        .ok_or_else(|| {
            ApiError::new(StatusCode::NOT_FOUND, "Foydalanuvchi topilmadi")
        })?;
    if let Some(role) = role {
        user.role = role;
    }
    Ok(Json(user.clone()))
}

async fn send_notification(
    State(backend): State<Backend>,
    _: Caller,
    Json(new): Json<notification::New>,
) -> Result<Json<Notification>, ApiError> {
    let mut db = backend.db();
    if db.user(new.receiver_id).is_none() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Foydalanuvchi topilmadi",
        ));
    }
    Ok(Json(db.notify(new.receiver_id, new.title, new.message)))
}
