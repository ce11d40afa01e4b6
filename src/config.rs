use crate::error::Result;
use crate::locale::Locale;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Paragraphs at least this many characters long are never section titles.
    pub max_title_len: usize,
    /// Locales tried for template detection, in preference order.
    pub supported_locales: Vec<Locale>,
    /// Template locale used when title counts tie.
    pub default_locale: Locale,
    /// Minimum detector confidence for the body language.
    pub min_confidence: f64,
    /// An unsupported language detected at or above this confidence over
    /// all languages rejects the document. Below it, detection falls back
    /// to the supported locales only.
    pub foreign_confidence: f64,
    pub filter_show_more: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_title_len: 60,
            supported_locales: Locale::ALL.to_vec(),
            default_locale: Locale::Ru,
            min_confidence: 0.0,
            foreign_confidence: 1.0,
            filter_show_more: true,
        }
    }
}

impl ParserConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ParserConfig = serde_json::from_str(&raw)?;
        debug!("Loaded config from {}: {:?}", path.as_ref().display(), config);
        Ok(config)
    }
}
