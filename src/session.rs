use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::api::ApiClient;
use crate::error::SessionError;
use crate::models::{Credentials, Profile, User};
use crate::utils;

/// The signed-in identity, mirrored to a JSON file so a restart restores it.
pub struct SessionStore {
    path: PathBuf,
    current: Mutex<Option<User>>,
}

impl SessionStore {
    /// Loads whatever session was saved at `path`. Anything unreadable counts
    /// as signed out.
    pub fn restore(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_session(&path) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring saved session: {err}");
                None
            }
        };
        if let Some(user) = &current {
            tracing::debug!(user_id = %user.id, "session restored");
        }
        Self {
            path,
            current: Mutex::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<User> {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Bearer token of the persisted identity, read back from storage.
    pub fn credential(&self) -> Option<String> {
        match read_session(&self.path) {
            Ok(user) => user.and_then(|u| u.token).filter(|t| !t.trim().is_empty()),
            Err(err) => {
                tracing::warn!("unable to read session credential: {err}");
                None
            }
        }
    }

    pub async fn login(
        &self,
        api: &ApiClient,
        credentials: &Credentials,
    ) -> Result<User, SessionError> {
        let user = api.login(credentials).await?;
        self.establish(user)
    }

    pub async fn register(&self, api: &ApiClient, profile: &Profile) -> Result<User, SessionError> {
        let user = api.register(profile).await?;
        self.establish(user)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        let mut guard = self.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        *guard = None;
        Ok(())
    }

    /// Storage is written before memory so a failed write leaves both as they were.
    fn establish(&self, user: User) -> Result<User, SessionError> {
        let mut guard = self.lock();
        write_session(&self.path, &user)?;
        *guard = Some(user.clone());
        tracing::info!(user_id = %user.id, "session established");
        Ok(user)
    }

    fn lock(&self) -> MutexGuard<'_, Option<User>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_session(path: &Path) -> Result<Option<User>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_session(path: &Path, user: &User) -> Result<(), SessionError> {
    utils::ensure_parent(path)?;
    let contents = serde_json::to_string_pretty(user)?;
    fs::write(path, contents)?;
    Ok(())
}
