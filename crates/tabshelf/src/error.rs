use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabshelfError {
    #[error("Unknown setting key: {0}")]
    InvalidKey(String),

    #[error("Bookmark node not found: {0}")]
    UnresolvedNode(String),

    #[error("Bookmark node is protected: {0}")]
    ProtectedNode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl TabshelfError {
    /// True for errors the navigator and editor treat as "nothing to do yet".
    pub fn is_unresolved(&self) -> bool {
        matches!(self, TabshelfError::UnresolvedNode(_))
    }
}

pub type Result<T> = std::result::Result<T, TabshelfError>;
