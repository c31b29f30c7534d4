use assert_fs::prelude::*;
use assert_fs::TempDir;
use data::Session;
use url::Url;
use crate::constants::FAKE_ANON_KEY;

pub const CONFIG_FILE_NAME: &str = "cloudnotes.toml";
pub const SESSION_FILE_NAME: &str = "session.toml";

/// A temporary directory with a `cloudnotes.toml` pointing at `backend_url`
/// and keeping the session file next to it.
pub fn setup_config(backend_url: &Url) -> TempDir {
    let root = TempDir::new().unwrap();
    let config = format!(
        r#"backend_url = "{}"
anon_key = "{}"
session_file = "{}"
"#,
        backend_url,
        FAKE_ANON_KEY,
        root.child(SESSION_FILE_NAME).to_str().unwrap(),
    );
    root.child(CONFIG_FILE_NAME).write_str(&config).unwrap();
    root
}

pub fn setup_config_with_session(
    backend_url: &Url,
    session: &Session,
) -> TempDir {
    let root = setup_config(backend_url);
    root.child(SESSION_FILE_NAME)
        .write_str(&toml::to_string(session).unwrap())
        .unwrap();
    root
}
