//! Keyword tables

use crate::SeverityTier;
use serde::{Deserialize, Serialize};

const CRITICAL_KEYWORDS: &[&str] = &[
    "suicid",
    "die",
    "end my life",
    "end it all",
    "harm myself",
    "self harm",
    "kill myself",
];

const HIGH_KEYWORDS: &[&str] = &["severe", "unbearable", "cant cope", "breakdown", "emergency"];

const MEDIUM_KEYWORDS: &[&str] = &[
    "anxious",
    "worried",
    "stressed",
    "depressed",
    "sleep",
    "overwhelm",
];

/// Lowercase substrings associated with one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    tier: SeverityTier,
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Create a set; keywords are lowercased and blanks dropped
    pub fn new<I, S>(tier: SeverityTier, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { tier, keywords }
    }

    pub fn tier(&self) -> SeverityTier {
        self.tier
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword contained in already-lowercased text
    pub fn find_in(&self, lowered: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Keyword lists as they appear in configuration files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordLists {
    #[serde(default)]
    pub critical: Vec<String>,
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
}

/// Ordered tier -> keyword-set mapping, most severe set first
///
/// `Low` never has a set: it is the tier of text matching nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KeywordLists", into = "KeywordLists")]
pub struct KeywordTable {
    sets: Vec<KeywordSet>,
}

impl KeywordTable {
    /// Build a table from per-tier keyword lists
    pub fn new<S: AsRef<str>>(critical: &[S], high: &[S], medium: &[S]) -> Self {
        Self {
            sets: vec![
                KeywordSet::new(SeverityTier::Critical, critical),
                KeywordSet::new(SeverityTier::High, high),
                KeywordSet::new(SeverityTier::Medium, medium),
            ],
        }
    }

    /// Sets in checking order (critical, high, medium)
    pub fn sets(&self) -> &[KeywordSet] {
        &self.sets
    }

    /// Keywords registered for a tier (empty for `Low`)
    pub fn keywords_for(&self, tier: SeverityTier) -> &[String] {
        self.sets
            .iter()
            .find(|s| s.tier == tier)
            .map(KeywordSet::keywords)
            .unwrap_or(&[])
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(CRITICAL_KEYWORDS, HIGH_KEYWORDS, MEDIUM_KEYWORDS)
    }
}

impl From<KeywordLists> for KeywordTable {
    fn from(lists: KeywordLists) -> Self {
        Self::new(
            lists.critical.as_slice(),
            lists.high.as_slice(),
            lists.medium.as_slice(),
        )
    }
}

impl From<KeywordTable> for KeywordLists {
    fn from(table: KeywordTable) -> Self {
        let owned = |tier: SeverityTier| table.keywords_for(tier).to_vec();
        KeywordLists {
            critical: owned(SeverityTier::Critical),
            high: owned(SeverityTier::High),
            medium: owned(SeverityTier::Medium),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = KeywordTable::default();
        let tiers: Vec<_> = table.sets().iter().map(|s| s.tier()).collect();
        assert_eq!(
            tiers,
            vec![SeverityTier::Critical, SeverityTier::High, SeverityTier::Medium]
        );
        assert!(table.keywords_for(SeverityTier::Low).is_empty());
        assert_eq!(table.keywords_for(SeverityTier::High).len(), 5);
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let set = KeywordSet::new(SeverityTier::High, ["  PANIC ", "", "Hopeless"]);
        assert_eq!(set.keywords(), &["panic".to_string(), "hopeless".to_string()]);
        assert_eq!(set.find_in("i feel hopeless"), Some("hopeless"));
        assert_eq!(set.find_in("fine"), None);
    }

    #[test]
    fn test_deserialize_partial_lists() {
        let table: KeywordTable =
            serde_json::from_str(r#"{"critical": ["No Way Out"], "medium": ["tired"]}"#).unwrap();
        assert_eq!(table.keywords_for(SeverityTier::Critical), &["no way out".to_string()]);
        assert!(table.keywords_for(SeverityTier::High).is_empty());
    }
}
