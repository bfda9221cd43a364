use thiserror::Error;

/// A single cell that could not be converted. Never fatal on its own.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot parse {kind} from {value:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("row {row} has {found} columns, expected at least {expected}")]
    Extraction {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("source unavailable: {context}")]
    SourceUnavailable {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn source_unavailable(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::SourceUnavailable {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
