use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use url::Url;
use crate::{DEFAULT_NOTES_TABLE, DEFAULT_SESSION_FILE};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppConfig {
    pub backend_url: Url,

    pub anon_key: String,

    #[serde(default = "app_config_default_session_file")]
    pub session_file: PathBuf,

    #[serde(default = "app_config_default_notes_table")]
    pub notes_table: String,
}

pub fn app_config_default_session_file() -> PathBuf {
    DEFAULT_SESSION_FILE.into()
}

pub fn app_config_default_notes_table() -> String {
    DEFAULT_NOTES_TABLE.into()
}
