use std::sync::Arc;
use async_trait::async_trait;
use data::{NewNote, Note, NoteId, NotePatch, Session};
use log::{debug, trace};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use crate::backend::rest::{error_message, RestConfig, RestIdentityProvider};
use crate::change_feed::{ChangeHub, ChangeKind};
use crate::identity::{IdentityError, IdentityProvider};
use crate::store::{NoteStore, StoreError};

const PREFER_HEADER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Notes table behind a PostgREST endpoint.
///
/// Row level security on the remote side scopes every request to the
/// user the access token belongs to.
pub struct RestNoteStore {
    client: Client,
    config: RestConfig,
    access_token: AccessToken,
    hub: Option<ChangeHub>,
}

enum AccessToken {
    Fixed(String),
    Provider(Arc<RestIdentityProvider>),
}

impl AccessToken {
    /// Asks the provider on every call, so refreshed tokens are picked up
    /// and expired ones get refreshed.
    async fn get(&self) -> Result<String, StoreError> {
        match self {
            AccessToken::Fixed(token) => Ok(token.clone()),
            AccessToken::Provider(provider) => provider.get_session().await?
                .map(|session| session.access_token)
                .ok_or(StoreError::Identity(IdentityError::NotSignedIn)),
        }
    }
}

impl RestNoteStore {
    /// Sends every request with the access token of `session` as it is now.
    pub fn new(
        client: Client,
        config: RestConfig,
        session: &Session,
    ) -> Self {
        RestNoteStore {
            client,
            config,
            access_token: AccessToken::Fixed(session.access_token.clone()),
            hub: None,
        }
    }

    /// Takes the access token from `provider` before each request.
    pub fn with_identity(
        client: Client,
        config: RestConfig,
        provider: Arc<RestIdentityProvider>,
    ) -> Self {
        RestNoteStore {
            client,
            config,
            access_token: AccessToken::Provider(provider),
            hub: None,
        }
    }

    /// Publishes this store's own successful writes to `hub`.
    pub fn with_change_hub(mut self, hub: ChangeHub) -> Self {
        self.hub = Some(hub);
        self
    }

    async fn request(&self, method: Method) -> Result<RequestBuilder, StoreError> {
        let access_token = self.access_token.get().await?;
        Ok(
            self.config.authorize(
                self.client.request(method, self.config.notes_url().clone()),
                Some(&access_token),
            )
        )
    }

    fn publish(&self, kind: ChangeKind, note: &Note) {
        if let Some(hub) = &self.hub {
            hub.publish(
                kind,
                self.config.notes_table(),
                serde_json::to_value(note).unwrap_or_default(),
            );
        }
    }

    /// Sends a write that returns the affected rows; no rows means the id
    /// matched nothing.
    async fn write_one(
        &self,
        request: RequestBuilder,
    ) -> Result<Note, StoreError> {
        let response = request
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .send()
            .await?;
        let rows: Vec<Note> = decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or(StoreError::NoteNotFound)
    }
}

#[async_trait]
impl NoteStore for RestNoteStore {
    async fn select_all(&self) -> Result<Vec<Note>, StoreError> {
        let response = self.request(Method::GET).await?
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let notes: Vec<Note> = decode(response).await?;
        trace!("selected {} notes", notes.len());
        Ok(notes)
    }

    async fn insert(&self, note: NewNote) -> Result<(), StoreError> {
        debug!("inserting note \"{}\"", note.title);
        let note = self.write_one(
            self.request(Method::POST).await?.json(&[note])
        ).await?;
        self.publish(ChangeKind::Insert, &note);
        Ok(())
    }

    async fn update(
        &self,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<(), StoreError> {
        debug!("updating note {id}");
        let note = self.write_one(
            self.request(Method::PATCH).await?
                .query(&[("id", format!("eq.{id}"))])
                .json(&patch)
        ).await?;
        self.publish(ChangeKind::Update, &note);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        debug!("deleting note {id}");
        let note = self.write_one(
            self.request(Method::DELETE).await?
                .query(&[("id", format!("eq.{id}"))])
        ).await?;
        self.publish(ChangeKind::Delete, &note);
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
) -> Result<T, StoreError> {
    if !response.status().is_success() {
        return Err(
            StoreError::Rejected {
                message: error_message(response).await,
            }
        );
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
