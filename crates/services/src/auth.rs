//! Account bootstrap: sign-up, sign-in, session restore, sign-out.
//!
//! On every successful authentication the profile snapshot, reading
//! level, and placement flag are derived from the server response and
//! written to the client store in one pass, so the rest of the app can
//! read them without further network calls.

use std::sync::Arc;

use tracing::{debug, warn};

use growin_core::model::UserId;
use growin_core::scoring::ReadingLevel;
use storage::repository::{AuthTokens, ClientPersistence, ProfileSnapshot};

use crate::api::{ApiClient, UserProfileData};
use crate::error::{ApiError, AuthError};

pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn ClientPersistence>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn ClientPersistence>) -> Self {
        Self { api, store }
    }

    /// Create an account. The backend does not issue tokens on sign-up;
    /// callers follow with [`AuthService::login`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` with the backend's rejection (taken
    /// username, invalid email) or a transport failure.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        self.api.signup(username, email, password).await?;
        Ok(())
    }

    /// Sign-up followed by an immediate sign-in with the same
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` from whichever of the two steps failed.
    pub async fn signup_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<ProfileSnapshot, AuthError> {
        self.signup(username, email, password).await?;
        self.login(email, password).await
    }

    /// Exchange credentials for tokens and hydrate the local store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for rejected credentials or transport
    /// failures, `AuthError::Storage` if the store cannot be written.
    pub async fn login(&self, email: &str, password: &str) -> Result<ProfileSnapshot, AuthError> {
        let data = self.api.login(email, password).await?;
        self.api.set_bearer(&data.access_token)?;

        let tokens = AuthTokens {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
        };
        self.store.set_tokens(&tokens).await?;
        self.hydrate(&data.user).await
    }

    /// Resume a previous session from stored tokens.
    ///
    /// Returns `Ok(None)` when there is nothing to restore or the stored
    /// token has expired; expired tokens are cleared so the next launch
    /// does not retry them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for storage failures and for API failures
    /// other than an expired token.
    pub async fn restore(&self) -> Result<Option<ProfileSnapshot>, AuthError> {
        let Some(tokens) = self.store.tokens().await? else {
            debug!("no stored tokens, starting signed out");
            return Ok(None);
        };
        self.api.set_bearer(&tokens.access_token)?;

        match self.api.fetch_me().await {
            Ok(user) => Ok(Some(self.hydrate(&user).await?)),
            Err(ApiError::AuthExpired) => {
                warn!("stored token expired, clearing credentials");
                self.api.clear_bearer()?;
                self.store.clear_tokens().await?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Sign out: drop the bearer token and wipe the client store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.api.clear_bearer()?;
        self.store.clear_all().await?;
        Ok(())
    }

    /// Write profile, level, and placement flag derived from one server
    /// profile. A backend level of 0 means placement has not run.
    async fn hydrate(&self, user: &UserProfileData) -> Result<ProfileSnapshot, AuthError> {
        let level = ReadingLevel::from_number(user.level);
        let profile = ProfileSnapshot {
            user_id: UserId::new(user.user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            level,
        };
        self.store.set_profile(&profile).await?;
        match level {
            Some(level) => {
                self.store.set_reading_level(level).await?;
                self.store.set_placement_done(true).await?;
            }
            None => {
                self.store.set_placement_done(false).await?;
            }
        }
        Ok(profile)
    }
}
