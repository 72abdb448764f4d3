use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;

use growin_core::scoring::ReadingLevel;

use super::SqliteClientStore;
use crate::repository::{AuthTokens, ClientPersistence, ProfileSnapshot, StorageError};

const KEY_TOKENS: &str = "auth_tokens";
const KEY_PROFILE: &str = "profile";
const KEY_LEVEL: &str = "reading_level";
const KEY_PLACEMENT_DONE: &str = "placement_done";

impl SqliteClientStore {
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let row = sqlx::query("SELECT value FROM client_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        sqlx::query(
            r"
            INSERT INTO client_state (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            ",
        )
        .bind(key)
        .bind(raw)
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM client_state WHERE key = ?1")
            .bind(key)
            .execute(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ClientPersistence for SqliteClientStore {
    async fn tokens(&self) -> Result<Option<AuthTokens>, StorageError> {
        self.get_json(KEY_TOKENS).await
    }

    async fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), StorageError> {
        self.put_json(KEY_TOKENS, tokens).await
    }

    async fn clear_tokens(&self) -> Result<(), StorageError> {
        self.delete(KEY_TOKENS).await
    }

    async fn profile(&self) -> Result<Option<ProfileSnapshot>, StorageError> {
        self.get_json(KEY_PROFILE).await
    }

    async fn set_profile(&self, profile: &ProfileSnapshot) -> Result<(), StorageError> {
        self.put_json(KEY_PROFILE, profile).await
    }

    async fn reading_level(&self) -> Result<Option<ReadingLevel>, StorageError> {
        self.get_json(KEY_LEVEL).await
    }

    async fn set_reading_level(&self, level: ReadingLevel) -> Result<(), StorageError> {
        self.put_json(KEY_LEVEL, &level).await
    }

    async fn placement_done(&self) -> Result<bool, StorageError> {
        Ok(self.get_json(KEY_PLACEMENT_DONE).await?.unwrap_or(false))
    }

    async fn set_placement_done(&self, done: bool) -> Result<(), StorageError> {
        self.put_json(KEY_PLACEMENT_DONE, &done).await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM client_state")
            .execute(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
