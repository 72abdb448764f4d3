use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use growin_core::model::UserId;
use growin_core::scoring::ReadingLevel;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Bearer token pair issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Locally cached snapshot of the authenticated user.
///
/// `level` is `None` until the placement test assigned one (the backend
/// reports level 0 for fresh accounts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub level: Option<ReadingLevel>,
}

/// Durable local cache of authentication and placement state.
///
/// Single-writer discipline: the submission coordinator and the login
/// bootstrap write here; every other component only reads. Writers must
/// treat values as last-write-wins and re-read before deriving a new
/// value rather than trusting a stale in-memory copy.
#[async_trait]
pub trait ClientPersistence: Send + Sync {
    /// Fetch the stored token pair, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn tokens(&self) -> Result<Option<AuthTokens>, StorageError>;

    /// Store the token pair, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), StorageError>;

    /// Drop the stored token pair (logout, expired auth).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn clear_tokens(&self) -> Result<(), StorageError>;

    /// Fetch the cached profile snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn profile(&self) -> Result<Option<ProfileSnapshot>, StorageError>;

    /// Store the profile snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn set_profile(&self, profile: &ProfileSnapshot) -> Result<(), StorageError>;

    /// Fetch the cached reading level, if one was assigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn reading_level(&self) -> Result<Option<ReadingLevel>, StorageError>;

    /// Store the authoritative reading level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn set_reading_level(&self, level: ReadingLevel) -> Result<(), StorageError>;

    /// Whether the placement test has been completed and acknowledged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn placement_done(&self) -> Result<bool, StorageError>;

    /// Record the placement-completed flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn set_placement_done(&self, done: bool) -> Result<(), StorageError>;

    /// Wipe every cached value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct CacheState {
    tokens: Option<AuthTokens>,
    profile: Option<ProfileSnapshot>,
    level: Option<ReadingLevel>,
    placement_done: bool,
}

/// In-memory persistence for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    state: Arc<Mutex<CacheState>>,
}

impl InMemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ClientPersistence for InMemoryPersistence {
    async fn tokens(&self) -> Result<Option<AuthTokens>, StorageError> {
        Ok(self.lock()?.tokens.clone())
    }

    async fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), StorageError> {
        self.lock()?.tokens = Some(tokens.clone());
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<(), StorageError> {
        self.lock()?.tokens = None;
        Ok(())
    }

    async fn profile(&self) -> Result<Option<ProfileSnapshot>, StorageError> {
        Ok(self.lock()?.profile.clone())
    }

    async fn set_profile(&self, profile: &ProfileSnapshot) -> Result<(), StorageError> {
        self.lock()?.profile = Some(profile.clone());
        Ok(())
    }

    async fn reading_level(&self) -> Result<Option<ReadingLevel>, StorageError> {
        Ok(self.lock()?.level)
    }

    async fn set_reading_level(&self, level: ReadingLevel) -> Result<(), StorageError> {
        self.lock()?.level = Some(level);
        Ok(())
    }

    async fn placement_done(&self) -> Result<bool, StorageError> {
        Ok(self.lock()?.placement_done)
    }

    async fn set_placement_done(&self, done: bool) -> Result<(), StorageError> {
        self.lock()?.placement_done = done;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        *self.lock()? = CacheState::default();
        Ok(())
    }
}
