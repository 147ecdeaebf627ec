use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for cabinet ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the input, touching the input file, creating the scratch
    /// directory or reading an extracted member failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The cabinet could not be loaded or extracted.
    #[error("{0}")]
    CabFormat(String),

    /// A metainfo document inside the cabinet could not be parsed.
    #[error("{} could not be loaded: {message}", path.display())]
    MetainfoParse {
        /// Extracted location of the document.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A metainfo document declared no releases.
    #[error("no releases in metainfo file {}", path.display())]
    NoRelease {
        /// Extracted location of the document.
        path: PathBuf,
    },

    /// The caller's cancellation token was tripped.
    #[error("operation was cancelled")]
    Cancelled,
}

impl IngestError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        IngestError::Io { context: context.into(), source }
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, IngestError>;
