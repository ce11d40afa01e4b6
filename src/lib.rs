//! Résumé extraction from `.docx` files produced by a fixed résumé template.
//!
//! The pipeline runs paragraph extraction, template/body language detection,
//! section segmentation, per-field extraction and typed section assembly.
//! The result is a [`models::resume::Resume`], which `etl::blocks` can turn
//! into a block document for a collaboration service.
//!
//! ```no_run
//! use resume_parser_rs::{parse_file, ParserConfig};
//!
//! fn main() -> resume_parser_rs::Result<()> {
//!     let etl = parse_file("resume.docx", &ParserConfig::default())?;
//!     let resume = etl.get_resume();
//!     println!("{}", serde_json::to_string_pretty(&resume).unwrap());
//!     Ok(())
//! }
//! ```

pub mod core {
    pub mod language;
    pub mod layout;
    pub mod parser;
    pub mod segmenter;
}

pub mod etl {
    pub mod blocks;
    pub mod fields;
    pub mod resume;
}

pub mod models {
    pub mod resume;
}

pub mod config;
pub mod error;
pub mod locale;

pub use config::ParserConfig;
pub use error::{Error, Result};
pub use etl::resume::ResumeEtl;
pub use locale::Locale;
pub use models::resume::Resume;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// One document paragraph.
///
/// A paragraph whose runs could not be merged keeps them as `Parts`;
/// consumers that need a flat string use [`Paragraph::text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paragraph {
    Single(String),
    Parts(Vec<String>),
}

impl Paragraph {
    /// Flattened text, runs joined with no separator.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Paragraph::Single(s) => Cow::Borrowed(s.as_str()),
            Paragraph::Parts(parts) => Cow::Owned(parts.concat()),
        }
    }

    pub fn parts(&self) -> &[String] {
        match self {
            Paragraph::Single(s) => std::slice::from_ref(s),
            Paragraph::Parts(parts) => parts,
        }
    }
}

impl From<&str> for Paragraph {
    fn from(s: &str) -> Self {
        Paragraph::Single(s.to_string())
    }
}

impl From<String> for Paragraph {
    fn from(s: String) -> Self {
        Paragraph::Single(s)
    }
}

impl From<Vec<String>> for Paragraph {
    fn from(mut parts: Vec<String>) -> Self {
        if parts.len() == 1 {
            Paragraph::Single(parts.remove(0))
        } else {
            Paragraph::Parts(parts)
        }
    }
}

/// Parse an in-memory `.docx` container.
pub fn parse_bytes(bytes: &[u8], config: &ParserConfig) -> Result<ResumeEtl> {
    let paragraphs = crate::core::parser::DocxParser::new().parse_bytes(bytes)?;
    ResumeEtl::new(paragraphs, config)
}

/// Parse a `.docx` file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<ResumeEtl> {
    use crate::core::parser::Parser;
    let paragraphs = crate::core::parser::DocxParser::new().parse(path)?;
    ResumeEtl::new(paragraphs, config)
}
