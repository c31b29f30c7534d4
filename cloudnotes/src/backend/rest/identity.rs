use std::path::PathBuf;
use async_stream::stream;
use data::{Session, User};
use futures::Stream;
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::{broadcast, Mutex};
use crate::SESSION_CHANGES_CAPACITY;
use crate::backend::rest::{error_message, RestConfig, SessionFile};
use crate::identity::{IdentityError, IdentityProvider, SessionChange};

const GRANT_PASSWORD: &str = "password";
const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// Identity through a GoTrue auth endpoint.
///
/// The session lives in a [`SessionFile`] between runs and is refreshed
/// through its refresh token once it expires.
pub struct RestIdentityProvider {
    client: Client,
    config: RestConfig,
    session_file: SessionFile,
    session: Mutex<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
    clock: fn() -> OffsetDateTime,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: User,
}

impl RestIdentityProvider {
    pub async fn open(
        client: Client,
        config: RestConfig,
        session_file: impl Into<PathBuf>,
    ) -> Result<Self, IdentityError> {
        let session_file = SessionFile::new(session_file);
        let session = session_file.load().await?;
        debug!(
            "session file {} {}",
            session_file.path().display(),
            if session.is_some() { "loaded" } else { "is absent" },
        );
        Ok(
            RestIdentityProvider {
                client,
                config,
                session_file,
                session: Mutex::new(session),
                changes: broadcast::channel(SESSION_CHANGES_CAPACITY).0,
                clock: OffsetDateTime::now_utc,
            }
        )
    }

    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        debug!("signing in \"{email}\"");
        let session = self.request_token(
            GRANT_PASSWORD,
            &PasswordGrant { email, password },
        ).await?;
        let mut current = self.session.lock().await;
        self.session_file.store(&session).await?;
        *current = Some(session.clone());
        drop(current);
        info!("signed in as \"{email}\"");
        self.emit(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn request_token(
        &self,
        grant_type: &str,
        grant: &impl Serialize,
    ) -> Result<Session, IdentityError> {
        let response = self.config.authorize(
            self.client.post(self.config.token_url.clone())
                .query(&[("grant_type", grant_type)])
                .json(grant),
            None,
        ).send().await?;
        let token: TokenResponse = rejected_unless_success(response).await?
            .json()
            .await?;
        Ok(token.into_session((self.clock)()))
    }

    async fn forget(
        &self,
        current: &mut Option<Session>,
    ) -> Result<(), IdentityError> {
        self.session_file.clear().await?;
        *current = None;
        self.emit(SessionChange::signed_out());
        Ok(())
    }

    fn emit(&self, change: SessionChange) {
        // no listeners is fine
        let _ = self.changes.send(change);
    }
}

impl IdentityProvider for RestIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, IdentityError> {
        let mut current = self.session.lock().await;
        let Some(session) = current.as_ref() else {
            return Ok(None)
        };
        if !session.is_expired((self.clock)()) {
            return Ok(Some(session.clone()))
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            debug!("session expired and has no refresh token");
            self.forget(&mut current).await?;
            return Ok(None)
        };
        debug!("refreshing the expired session");
        match self.request_token(
            GRANT_REFRESH_TOKEN,
            &RefreshGrant { refresh_token: &refresh_token },
        ).await {
            Ok(session) => {
                self.session_file.store(&session).await?;
                *current = Some(session.clone());
                drop(current);
                self.emit(SessionChange::token_refreshed(session.clone()));
                Ok(Some(session))
            },
            Err(IdentityError::Rejected { message }) => {
                warn!("session refresh rejected: {message}");
                self.forget(&mut current).await?;
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    fn session_changes(&self) -> impl Stream<Item=SessionChange> + Send + 'static {
        let mut receiver = self.changes.subscribe();
        stream! {
            loop {
                match receiver.recv().await {
                    Ok(change) => yield change,
                    Err(broadcast::error::RecvError::Lagged(n)) =>
                        warn!("missed {n} session changes"),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let mut current = self.session.lock().await;
        if let Some(session) = current.as_ref() {
            debug!("revoking the session");
            let response = self.config.authorize(
                self.client.post(self.config.logout_url.clone()),
                Some(&session.access_token),
            ).send().await?;
            match response.status() {
                // the session is already gone on the remote side
                StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND => {
                    debug!("session was already revoked");
                },
                _ => {
                    rejected_unless_success(response).await?;
                },
            }
        }
        self.forget(&mut current).await?;
        info!("signed out");
        Ok(())
    }
}

impl TokenResponse {
    fn into_session(self, now: OffsetDateTime) -> Session {
        let expires_at = self.expires_at
            .and_then(|at| OffsetDateTime::from_unix_timestamp(at).ok())
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

async fn rejected_unless_success(
    response: Response,
) -> Result<Response, IdentityError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(
            IdentityError::Rejected {
                message: error_message(response).await,
            }
        )
    }
}
