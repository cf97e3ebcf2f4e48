use thiserror::Error;

/// Errors from the tolerance estimator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToleranceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from the dose log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid dose time: {0}")]
    InvalidTime(String),
    #[error("dose log lock poisoned")]
    Poisoned,
    #[error("dose ids exhausted")]
    IdsExhausted,
}

/// Errors from loading the substance catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BioclockError {
    #[error(transparent)]
    Tolerance(#[from] ToleranceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("unknown substance: {0}")]
    UnknownSubstance(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
