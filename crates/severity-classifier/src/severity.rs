//! Severity tiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Urgency of a mental-health disclosure
///
/// Variants are declared in ascending urgency so the derived ordering gives
/// `Critical > High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityTier {
    /// All tiers, most urgent first
    pub const BY_URGENCY: [SeverityTier; 4] = [
        SeverityTier::Critical,
        SeverityTier::High,
        SeverityTier::Medium,
        SeverityTier::Low,
    ];

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
            SeverityTier::Critical => "critical",
        }
    }

    /// Human-readable label shown next to the severity meter
    pub fn label(&self) -> &'static str {
        match self {
            SeverityTier::Low => "Low",
            SeverityTier::Medium => "Medium",
            SeverityTier::High => "High",
            SeverityTier::Critical => "Critical",
        }
    }

    /// How full the severity meter is drawn (percent)
    pub fn meter_percent(&self) -> u8 {
        match self {
            SeverityTier::Low => 25,
            SeverityTier::Medium => 50,
            SeverityTier::High => 75,
            SeverityTier::Critical => 100,
        }
    }

    /// Whether the patient should be offered emergency services right away
    pub fn requires_emergency(&self) -> bool {
        matches!(self, SeverityTier::Critical)
    }

    /// Position in a queue sorted by urgency (0 = handle first)
    pub fn urgency_rank(&self) -> u8 {
        match self {
            SeverityTier::Critical => 0,
            SeverityTier::High => 1,
            SeverityTier::Medium => 2,
            SeverityTier::Low => 3,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognised tier names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown severity tier: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for SeverityTier {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SeverityTier::Low),
            "medium" => Ok(SeverityTier::Medium),
            "high" => Ok(SeverityTier::High),
            "critical" => Ok(SeverityTier::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(SeverityTier::Critical > SeverityTier::High);
        assert!(SeverityTier::High > SeverityTier::Medium);
        assert!(SeverityTier::Medium > SeverityTier::Low);
    }

    #[test]
    fn test_urgency_rank_matches_ordering() {
        let mut tiers = vec![
            SeverityTier::Low,
            SeverityTier::Critical,
            SeverityTier::Medium,
            SeverityTier::High,
        ];
        tiers.sort_by_key(|t| t.urgency_rank());
        assert_eq!(tiers, SeverityTier::BY_URGENCY.to_vec());
    }

    #[test]
    fn test_default_is_low() {
        assert_eq!(SeverityTier::default(), SeverityTier::Low);
    }

    #[test]
    fn test_parse() {
        assert_eq!("critical".parse::<SeverityTier>(), Ok(SeverityTier::Critical));
        assert_eq!(" High ".parse::<SeverityTier>(), Ok(SeverityTier::High));
        assert!("urgent".parse::<SeverityTier>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SeverityTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: SeverityTier = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(back, SeverityTier::Critical);
    }

    #[test]
    fn test_meter() {
        assert_eq!(SeverityTier::Low.meter_percent(), 25);
        assert_eq!(SeverityTier::Critical.meter_percent(), 100);
        assert_eq!(SeverityTier::High.label(), "High");
        assert!(SeverityTier::Critical.requires_emergency());
        assert!(!SeverityTier::High.requires_emergency());
    }
}
