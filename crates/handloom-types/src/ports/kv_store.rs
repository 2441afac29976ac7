use async_trait::async_trait;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Backend(String),

    #[error("stored data unreadable: {0}")]
    Corrupt(String),

    #[error("order {0} already stored")]
    DuplicateOrder(String),
}

/// String-keyed session storage holding serialized snapshots.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    /// Returns whether the key was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
