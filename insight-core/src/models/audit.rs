use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureType {
    Conceptual,
    Procedural,
    Motivational,
    Prerequisite,
    Linguistic,
}

impl FailureType {
    pub const ALL: [FailureType; 5] = [
        FailureType::Conceptual,
        FailureType::Procedural,
        FailureType::Motivational,
        FailureType::Prerequisite,
        FailureType::Linguistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::Conceptual => "conceptual",
            FailureType::Procedural => "procedural",
            FailureType::Motivational => "motivational",
            FailureType::Prerequisite => "prerequisite",
            FailureType::Linguistic => "linguistic",
        }
    }
}

impl FromStr for FailureType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root-cause report derived from a classroom snapshot. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticAudit {
    pub generated_at: DateTime<Utc>,
    pub root_cause: String,
    pub failure_type: FailureType,
    pub severity: Severity,
    pub bridge_activity: String,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_type_parse_is_case_insensitive() {
        assert_eq!("Procedural".parse(), Ok(FailureType::Procedural));
        assert_eq!(" linguistic ".parse(), Ok(FailureType::Linguistic));
        assert!("emotional".parse::<FailureType>().is_err());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("CRITICAL".parse(), Ok(Severity::Critical));
        assert!("severe".parse::<Severity>().is_err());
    }
}
