#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AuthTokens, ClientPersistence, InMemoryPersistence, ProfileSnapshot, StorageError,
};
pub use sqlite::{SqliteClientStore, SqliteInitError};
