//! Phrase lexicons used by the struggle dimension calculators.
//!
//! The lists are data, not code: a bundled `lexicon.toml` is compiled in and a
//! deployment may overlay its own file (`[lexicon] path`). Each list becomes a
//! single case-insensitive alternation so a turn is tested once per list.

use config::{Config, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use shellexpand::tilde;

use crate::config::LexiconConfig;
use crate::error::Result;

const BUNDLED_LEXICON: &str = include_str!("../lexicon.toml");

/// Raw phrase lists as read from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconSource {
    pub surface: Vec<String>,
    pub deep: Vec<String>,
    pub confusion: Vec<String>,
    pub frustration: Vec<String>,
}

/// Compiled lexicons. Construct once and share by reference.
#[derive(Debug, Clone)]
pub struct Lexicon {
    surface: Option<Regex>,
    deep: Option<Regex>,
    confusion: Option<Regex>,
    frustration: Option<Regex>,
}

impl Lexicon {
    /// The lexicon shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::load(&LexiconConfig::default())
    }

    /// Bundled lists, overlaid by the configured file when one is set.
    pub fn load(config: &LexiconConfig) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(BUNDLED_LEXICON, FileFormat::Toml));

        if let Some(path) = &config.path {
            let expanded = tilde(path).to_string();
            tracing::info!(path = %expanded, "Loading lexicon override");
            builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
        }

        let source: LexiconSource = builder.build()?.try_deserialize()?;
        Self::from_source(&source)
    }

    pub fn from_source(source: &LexiconSource) -> Result<Self> {
        Ok(Self {
            surface: compile(&source.surface)?,
            deep: compile(&source.deep)?,
            confusion: compile(&source.confusion)?,
            frustration: compile(&source.frustration)?,
        })
    }

    pub fn is_surface(&self, text: &str) -> bool {
        matches(&self.surface, text)
    }

    pub fn is_deep(&self, text: &str) -> bool {
        matches(&self.deep, text)
    }

    pub fn is_confused(&self, text: &str) -> bool {
        matches(&self.confusion, text)
    }

    pub fn is_frustrated(&self, text: &str) -> bool {
        matches(&self.frustration, text)
    }
}

/// An empty list compiles to `None`, which never matches.
fn compile(patterns: &[String]) -> Result<Option<Regex>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let alternation = patterns
        .iter()
        .map(|p| format!("(?:{})", p))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Some(Regex::new(&format!("(?i){}", alternation))?))
}

fn matches(re: &Option<Regex>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}
