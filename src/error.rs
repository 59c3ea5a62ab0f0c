use thiserror::Error;

/// Failure of a remote fetch. Transport problems never escape as raw errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network error, timeout or non-2xx status.
    #[error("results API unreachable: {0}")]
    Unreachable(String),

    /// The body was not a draw payload.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cached draw {number} is corrupt: {reason}")]
    Corrupt { number: u32, reason: String },
}

pub type CacheResult<T> = Result<T, CacheError>;
