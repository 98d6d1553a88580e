//! Authentication session and its persistence.
//!
//! A [`Session`] is an explicit value handed to every call that needs a user.
//! Nothing in this crate keeps a global session; persistence between runs is
//! delegated to a [`SessionStore`].
//!
//! # Examples
//!
//! ```
//! use rental_client::{
//!     models::UserId,
//!     session::{AuthToken, Credentials, MemorySessionStore, Session, SessionStore},
//! };
//!
//! let store = MemorySessionStore::new();
//! assert!(!store.load()?.is_authenticated());
//!
//! let creds = Credentials::new(AuthToken::new("tok"), UserId::new(4));
//! store.save(&Session::Authenticated(creds))?;
//! assert_eq!(store.load()?.user_id(), Some(UserId::new(4)));
//! # Ok::<(), rental_client::error::RentalError>(())
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    error::{RentalError, Result},
    models::{RoleId, User, UserId},
};

/// Bearer token issued at login.
///
/// # Security
///
/// - `Debug` never prints the value
/// - Memory is zeroized on drop
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// What the client knows about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    token: AuthToken,
    user_id: UserId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role_id: Option<RoleId>,
}

impl Credentials {
    /// Credentials with only the token and user id.
    #[must_use]
    pub fn new(token: AuthToken, user_id: UserId) -> Self {
        Self { token, user_id, name: None, email: None, role_id: None }
    }

    /// Credentials enriched with the user's profile.
    #[must_use]
    pub fn from_user(token: AuthToken, user: &User) -> Self {
        Self {
            token,
            user_id: user.id_usuario,
            name: Some(user.nombres.clone()),
            email: Some(user.email.clone()),
            role_id: user.id_rol,
        }
    }

    /// Bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose()
    }

    /// Signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Display name, when known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Email address, when known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Role, when known.
    #[must_use]
    pub const fn role_id(&self) -> Option<RoleId> {
        self.role_id
    }
}

/// Authentication state for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// No one is signed in.
    #[default]
    Unauthenticated,
    /// Signed in.
    Authenticated(Credentials),
}

impl Session {
    /// Returns true when signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Bearer token, when signed in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.credentials().map(Credentials::token)
    }

    /// Signed-in user id.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.credentials().map(Credentials::user_id)
    }

    /// Credentials, when signed in.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Authenticated(creds) => Some(creds),
            Self::Unauthenticated => None,
        }
    }

    /// Credentials, or [`RentalError::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Unauthenticated`] when no one is signed in.
    pub fn require(&self) -> Result<&Credentials> {
        self.credentials().ok_or(RentalError::Unauthenticated)
    }
}

/// Persists a [`Session`] between runs.
pub trait SessionStore: Send + Sync {
    /// Loads the stored session; a missing one is [`Session::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::SessionStore`] if the store cannot be read.
    fn load(&self) -> Result<Session>;

    /// Stores a session, replacing any previous one.
    ///
    /// Saving [`Session::Unauthenticated`] is equivalent to [`clear`](Self::clear).
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::SessionStore`] if the store cannot be written.
    fn save(&self, session: &Session) -> Result<()>;

    /// Forgets the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::SessionStore`] if the store cannot be written.
    fn clear(&self) -> Result<()>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Credentials>>> {
        self.credentials
            .lock()
            .map_err(|_| RentalError::SessionStore("session lock poisoned".to_owned()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session> {
        Ok(self.slot()?.clone().map_or(Session::Unauthenticated, Session::Authenticated))
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot()? = session.credentials().cloned();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// JSON file store.
///
/// On Unix the file is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        std::io::Write::write_all(&mut file, contents)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::Unauthenticated);
            }
            Err(e) => {
                return Err(RentalError::SessionStore(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let credentials: Credentials = serde_json::from_slice(&contents).map_err(|e| {
            RentalError::SessionStore(format!("corrupt session file {}: {e}", self.path.display()))
        })?;
        Ok(Session::Authenticated(credentials))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let Some(credentials) = session.credentials() else {
            return self.clear();
        };

        let mut json = serde_json::to_vec(credentials)
            .map_err(|e| RentalError::SessionStore(format!("cannot encode session: {e}")))?;
        let result = self.write(&json);
        json.zeroize();

        result.map_err(|e| {
            RentalError::SessionStore(format!("cannot write {}: {e}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RentalError::SessionStore(format!(
                "cannot remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
