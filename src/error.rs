use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Invalid trade: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl JournalError {
    pub fn validation(message: impl Into<String>) -> Self {
        JournalError::Validation(message.into())
    }
}

impl From<rusqlite::Error> for JournalError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => JournalError::NotFound(err.to_string()),
            other => JournalError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
