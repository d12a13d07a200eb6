use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to access profile file: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile file is not a valid key-value map: {0}")]
    Format(#[from] serde_json::Error)
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// String-keyed persistent storage scoped to a single profile.
///
/// Values are opaque strings; callers serialise whatever they keep
/// under a key. `set` replaces the previous value wholesale.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}
