use thiserror::Error;

/// Errors the media cache lets reach a caller. Only a genuine transport
/// failure surfaces; storage faults are absorbed inside the pipeline.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("network unavailable")]
    Unavailable,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cache storage unavailable")]
    Unavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache entry: {0}")]
    Corrupt(String),
}
