//! Storage for the authentication token

use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::SessionStore;

/// An opaque bearer token, returned by the server on login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken {
    content: String,
}

impl AuthToken {
    pub fn new<S: ToString>(content: S) -> Self {
        Self { content: content.to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

/// Tokens must not end up in logs
impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken(..)")
    }
}


/// A session that only lives as long as the process
#[derive(Debug, Default)]
pub struct MemorySession {
    token: Option<AuthToken>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        Self { token: Some(token) }
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<AuthToken> {
        self.token.clone()
    }

    fn store_token(&mut self, token: AuthToken) -> Result<()> {
        self.token = Some(token);
        Ok(())
    }
}


/// A session that is persisted in a JSON file, so that it survives restarts
#[derive(Debug)]
pub struct FileSession {
    backing_file: PathBuf,
    data: SessionData,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct SessionData {
    #[serde(rename = "authToken")]
    auth_token: Option<AuthToken>,
}

impl FileSession {
    /// Initialize a session from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let data = serde_json::from_reader(file)?;

        Ok(Self {
            backing_file: PathBuf::from(path),
            data,
        })
    }

    /// Initialize an empty (unauthenticated) session
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
            data: SessionData::default(),
        }
    }

    /// Load the session file, or start an empty session if it is missing or invalid
    pub fn open(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(session) => session,
            Err(err) => {
                log::debug!("No usable session in {:?} ({}). Starting unauthenticated", path, err);
                Self::new(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.backing_file
    }

    fn save_to_file(&self) -> Result<()> {
        let file = std::fs::File::create(&self.backing_file)?;
        serde_json::to_writer(file, &self.data)?;
        Ok(())
    }
}

impl SessionStore for FileSession {
    fn token(&self) -> Option<AuthToken> {
        self.data.auth_token.clone()
    }

    fn store_token(&mut self, token: AuthToken) -> Result<()> {
        self.data.auth_token = Some(token);
        if let Err(err) = self.save_to_file() {
            log::warn!("Unable to save session to {:?}: {}", self.backing_file, err);
            return Err(err);
        }
        Ok(())
    }
}
