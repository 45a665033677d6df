pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot build an index over an empty chunk list")]
    EmptyIndex,

    #[error("embedding model error: {0}")]
    Model(String),

    #[error("configuration error: {0}")]
    Config(String),
}
