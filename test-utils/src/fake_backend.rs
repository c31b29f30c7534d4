use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use axum::{middleware, Json, Router};
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use data::{NewNote, Note, NoteId, NotePatch, Session, User, UserId};
use serde::Deserialize;
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use url::Url;
use uuid::Uuid;
use crate::constants::{FAKE_ANON_KEY, FAKE_TOKEN_LIFETIME_SECS};

type SharedState = Arc<Mutex<FakeBackendState>>;

/// A hosted backend stand-in: a PostgREST notes table with per-user row
/// security and a GoTrue token endpoint, served on a random local port.
///
/// The server stops when this is dropped.
pub struct FakeBackend {
    url: Url,
    state: SharedState,
    server: AbortHandle,
}

#[derive(Debug, Default)]
pub struct FakeBackendState {
    pub notes: Vec<Note>,
    accounts: HashMap<String, (String, User)>,
    access_tokens: HashMap<String, User>,
    refresh_tokens: HashMap<String, User>,
    pub requests: Vec<String>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = SharedState::default();
        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_notes)
                    .post(insert_notes)
                    .patch(update_notes)
                    .delete(delete_notes),
            )
            .route("/auth/v1/token", post(issue_token))
            .route("/auth/v1/logout", post(logout))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await
            .expect("failed to bind the fake backend");
        let address = listener.local_addr()
            .expect("fake backend has no local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await
                .expect("fake backend failed");
        }).abort_handle();
        FakeBackend {
            url: Url::parse(&format!("http://{address}/"))
                .expect("invalid fake backend url"),
            state,
            server,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn add_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: UserId(Uuid::new_v4().hyphenated().to_string()),
            email: Some(email.to_owned()),
        };
        lock(&self.state).accounts.insert(
            email.to_owned(),
            (password.to_owned(), user.clone()),
        );
        user
    }

    /// A session as if `user` had just signed in.
    pub fn issue_session(&self, user: &User) -> Session {
        lock(&self.state).issue(user)
    }

    /// Makes every access token handed out so far invalid; refresh tokens
    /// keep working.
    pub fn expire_access_tokens(&self) {
        lock(&self.state).access_tokens.clear();
    }

    pub fn seed_notes(&self, notes: impl IntoIterator<Item=Note>) {
        lock(&self.state).notes.extend(notes);
    }

    pub fn notes(&self) -> Vec<Note> {
        lock(&self.state).notes.clone()
    }

    /// `"<METHOD> <path and query>"` of every request served, oldest first.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakeBackendState {
    fn issue(&mut self, user: &User) -> Session {
        let access_token = Uuid::new_v4().simple().to_string();
        let refresh_token = Uuid::new_v4().simple().to_string();
        self.access_tokens.insert(access_token.clone(), user.clone());
        self.refresh_tokens.insert(refresh_token.clone(), user.clone());
        Session {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: Some(
                OffsetDateTime::now_utc()
                    + Duration::seconds(FAKE_TOKEN_LIFETIME_SECS),
            ),
            user: user.clone(),
        }
    }

    fn authorized_user(&self, headers: &HeaderMap) -> Result<User, Response> {
        if !has_api_key(headers) {
            return Err(invalid_api_key());
        }
        headers.get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| self.access_tokens.get(token))
            .cloned()
            .ok_or_else(|| rejection(
                StatusCode::UNAUTHORIZED,
                json!({ "code": "PGRST301", "message": "JWT expired" }),
            ))
    }
}

fn lock(state: &SharedState) -> MutexGuard<'_, FakeBackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rejection(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn has_api_key(headers: &HeaderMap) -> bool {
    headers.get("apikey")
        .and_then(|value| value.to_str().ok())
        == Some(FAKE_ANON_KEY)
}

fn invalid_api_key() -> Response {
    rejection(
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Invalid API key" }),
    )
}

fn id_filter(params: &HashMap<String, String>) -> Result<&str, Response> {
    params.get("id")
        .and_then(|filter| filter.strip_prefix("eq."))
        .ok_or_else(|| rejection(
            StatusCode::BAD_REQUEST,
            json!({ "message": "an id filter is required" }),
        ))
}

async fn record_request(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let line = format!("{} {}", request.method(), request.uri());
    lock(&state).requests.push(line);
    next.run(request).await
}

async fn select_notes(
    State(state): State<SharedState>,
    Path(_table): Path<String>,
    headers: HeaderMap,
) -> Response {
    let state = lock(&state);
    let user = match state.authorized_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut notes: Vec<&Note> = state.notes.iter()
        .filter(|note| note.user_id == user.id)
        .collect();
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(notes).into_response()
}

async fn insert_notes(
    State(state): State<SharedState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(rows): Json<Vec<NewNote>>,
) -> Response {
    let mut state = lock(&state);
    let user = match state.authorized_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if rows.iter().any(|row| row.title.is_empty()) {
        return rejection(
            StatusCode::BAD_REQUEST,
            json!({
                "code": "23514",
                "message": format!(
                    "new row for relation \"{table}\" violates check constraint \"{table}_title_check\"",
                ),
            }),
        );
    }
    let inserted: Vec<Note> = rows.into_iter()
        .map(|row| Note {
            id: NoteId::from(Uuid::new_v4()),
            title: row.title,
            content: row.content,
            created_at: OffsetDateTime::now_utc(),
            user_id: user.id.clone(),
        })
        .collect();
    for note in &inserted {
        state.notes.insert(0, note.clone());
    }
    (StatusCode::CREATED, Json(inserted)).into_response()
}

async fn update_notes(
    State(state): State<SharedState>,
    Path(_table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(patch): Json<NotePatch>,
) -> Response {
    let mut state = lock(&state);
    let user = match state.authorized_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let id = match id_filter(&params) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let updated: Vec<Note> = state.notes.iter_mut()
        .filter(|note| note.user_id == user.id && &*note.id == id)
        .map(|note| {
            note.title = patch.title.clone();
            note.content = patch.content.clone();
            note.clone()
        })
        .collect();
    Json(updated).into_response()
}

async fn delete_notes(
    State(state): State<SharedState>,
    Path(_table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    let user = match state.authorized_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let id = match id_filter(&params) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let (deleted, kept): (Vec<Note>, Vec<Note>) = state.notes.drain(..)
        .partition(|note| note.user_id == user.id && &*note.id == id);
    state.notes = kept;
    Json(deleted).into_response()
}

#[derive(Deserialize)]
struct TokenQuery {
    grant_type: String,
}

#[derive(Deserialize)]
struct TokenGrant {
    email: Option<String>,
    password: Option<String>,
    refresh_token: Option<String>,
}

async fn issue_token(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    Json(grant): Json<TokenGrant>,
) -> Response {
    let mut state = lock(&state);
    if !has_api_key(&headers) {
        return invalid_api_key();
    }
    let user = match query.grant_type.as_str() {
        "password" => {
            let account = grant.email.as_ref()
                .and_then(|email| state.accounts.get(email));
            match account {
                Some((password, user))
                    if Some(password) == grant.password.as_ref() => user.clone(),
                _ => return rejection(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid login credentials",
                    }),
                ),
            }
        },
        "refresh_token" => {
            let user = grant.refresh_token.as_ref()
                .and_then(|token| state.refresh_tokens.remove(token));
            match user {
                Some(user) => user,
                None => return rejection(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid Refresh Token: Refresh Token Not Found",
                    }),
                ),
            }
        },
        other => return rejection(
            StatusCode::BAD_REQUEST,
            json!({ "code": 400, "msg": format!("unsupported grant type {other}") }),
        ),
    };
    let session = state.issue(&user);
    Json(json!({
        "access_token": session.access_token,
        "token_type": "bearer",
        "expires_in": FAKE_TOKEN_LIFETIME_SECS,
        "refresh_token": session.refresh_token,
        "user": {
            "id": user.id,
            "aud": "authenticated",
            "email": user.email,
        },
    })).into_response()
}

async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    let user = match state.authorized_user(&headers) {
        Ok(user) => user,
        Err(_) => return rejection(
            StatusCode::UNAUTHORIZED,
            json!({ "code": 401, "msg": "invalid JWT" }),
        ),
    };
    state.access_tokens.retain(|_, owner| owner.id != user.id);
    state.refresh_tokens.retain(|_, owner| owner.id != user.id);
    StatusCode::NO_CONTENT.into_response()
}
