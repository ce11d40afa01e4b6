//! Error types for the résumé parser.

use std::io;
use thiserror::Error;

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole document parse.
///
/// Everything section- or field-local is logged and turned into an omitted
/// key instead; see `models::resume::ValidationError`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a readable zip container.
    #[error("Invalid document container: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The main text part is not well-formed XML.
    #[error("Malformed document XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The main text part is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The container has no main text part.
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// No supported language could be detected in the free text.
    #[error("Document language could not be detected")]
    LanguageUndetected,

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
