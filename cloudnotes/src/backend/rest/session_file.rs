
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use data::Session;
use log::{debug, error};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use crate::identity::IdentityError;
use crate::rng::make_uuid;

#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

/// The persisted session, so that signing in survives restarts.
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionFile {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means nobody is signed in.
    pub async fn load(&self) -> Result<Option<Session>, IdentityError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&contents)?))
    }

    /// Replaces the file as a whole; readable by the owner only.
    pub async fn store(&self, session: &Session) -> Result<(), IdentityError> {
        let contents = toml::to_string(session)?;
        let tmp_path = self.tmp_path();
        let written = match write_private(&tmp_path, contents.as_bytes()).await {
            Ok(()) => fs::rename(&tmp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            remove_tmp_file(&tmp_path).await;
            return Err(e.into())
        }
        debug!("session stored in {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), IdentityError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}", make_uuid(&mut rand::rng()).simple()));
        self.path.with_file_name(name)
    }
}

async fn remove_tmp_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => (),
        Err(e) if e.kind() == ErrorKind::NotFound => (),
        Err(e) => error!(
            "failed to remove temporary session file {}: {e}",
            path.display(),
        ),
    }
}

async fn write_private(
    path: &Path,
    contents: &[u8],
) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(SESSION_FILE_MODE);
    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(())
}
