use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Malformed catalog entry #{index}: {reason}")]
    MalformedCatalogEntry { index: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Stable snake_case name of the error kind, used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::CatalogUnavailable(_) => "catalog_unavailable",
            Error::EmbeddingUnavailable(_) => "embedding_unavailable",
            Error::MalformedCatalogEntry { .. } => "malformed_catalog_entry",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
