use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-session struggle record. All four values live in [0, 1] and are
/// rounded to 3 decimals before they leave the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StruggleDimensions {
    pub socratic_depth: f64,
    pub error_persistence: f64,
    pub frustration_sentiment: f64,
    pub composite: f64,
}

/// Result of a non-persisting struggle check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheck {
    pub is_struggling: bool,
    pub score: f64,
}

/// One of the three raw struggle dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    SocraticDepth,
    ErrorPersistence,
    FrustrationSentiment,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::SocraticDepth => "socraticDepth",
            Dimension::ErrorPersistence => "errorPersistence",
            Dimension::FrustrationSentiment => "frustrationSentiment",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
