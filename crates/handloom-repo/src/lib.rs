//! handloom-repo: session store adapters (in-memory, SQLite) and the typed
//! cart/order store built on them.

#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use handloom_types::ports::kv_store::{KeyValueStore, StoreError};

#[cfg(feature = "memory")]
pub mod memory;
pub mod session;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use session::SessionStore;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://handloom.db";

pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteStore),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

/// The store plus the cart/order layer on top, ready for the services.
pub async fn build_session(url: Option<&str>) -> anyhow::Result<SessionStore<Repo>> {
    Ok(SessionStore::new(build_repo(url).await?))
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(_: Option<&str>) -> anyhow::Result<Self> {
        tracing::info!("using in-memory session store");
        Ok(Repo::Memory(memory::InMemoryStore::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        Ok(Repo::Sqlite(sqlite::SqliteStore::new(url).await?))
    }

    // Both enabled: a URL selects SQLite, otherwise the session stays in memory.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Repo::Sqlite(sqlite::SqliteStore::new(url).await?)),
            None => {
                tracing::info!("no DATABASE_URL, using in-memory session store");
                Ok(Repo::Memory(memory::InMemoryStore::new()))
            }
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for Repo {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(s) => s.get(key).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(s) => s.set(key, value).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(s) => s.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(s) => s.remove(key).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(s) => s.remove(key).await,
        }
    }
}
