mod identity;
mod session_file;
mod store;

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use url::Url;
use crate::config::AppConfig;
pub use identity::RestIdentityProvider;
pub use session_file::SessionFile;
pub use store::RestNoteStore;

const REST_PATH: &str = "rest/v1/";
const AUTH_TOKEN_PATH: &str = "auth/v1/token";
const AUTH_LOGOUT_PATH: &str = "auth/v1/logout";
const API_KEY_HEADER: &str = "apikey";

/// Endpoints of a hosted backend: a PostgREST data API and a GoTrue auth
/// API under the same root.
#[derive(Clone, Debug)]
pub struct RestConfig {
    anon_key: String,
    notes_table: String,
    notes_url: Url,
    token_url: Url,
    logout_url: Url,
}

impl RestConfig {
    pub fn new(
        base_url: &Url,
        anon_key: impl Into<String>,
        notes_table: &str,
    ) -> Result<Self, url::ParseError> {
        let mut root = base_url.clone();
        if !root.path().ends_with('/') {
            root.set_path(&format!("{}/", root.path()));
        }
        Ok(
            RestConfig {
                anon_key: anon_key.into(),
                notes_table: notes_table.to_owned(),
                notes_url: root.join(REST_PATH)?.join(notes_table)?,
                token_url: root.join(AUTH_TOKEN_PATH)?,
                logout_url: root.join(AUTH_LOGOUT_PATH)?,
            }
        )
    }

    pub fn from_app_config(
        config: &AppConfig,
    ) -> Result<Self, url::ParseError> {
        RestConfig::new(
            &config.backend_url,
            config.anon_key.clone(),
            &config.notes_table,
        )
    }

    pub fn notes_table(&self) -> &str {
        &self.notes_table
    }

    pub fn notes_url(&self) -> &Url {
        &self.notes_url
    }

    fn authorize(
        &self,
        request: RequestBuilder,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        let request = request.header(API_KEY_HEADER, &self.anon_key);
        match access_token {
            Some(token) => request.bearer_auth(token),
            None => request.bearer_auth(&self.anon_key),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Picks the human-readable message out of a failed response.
///
/// PostgREST says `message`, GoTrue says `msg` or `error_description`
/// depending on the endpoint; anything else is passed on as is.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return format!("{status}: {e}"),
    };
    message_from_body(&text)
        .unwrap_or_else(|| if text.trim().is_empty() {
            status.to_string()
        } else {
            text
        })
}

fn message_from_body(text: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(text).ok()?;
    body.message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error)
}
