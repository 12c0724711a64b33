//! Severity Classifier Implementation

use crate::keywords::KeywordTable;
use crate::SeverityTier;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Assigned tier
    pub severity: SeverityTier,
    /// Keyword that decided the tier (`None` for the `Low` default)
    pub matched_keyword: Option<String>,
}

/// Keyword-table-driven severity classifier
///
/// Matching is plain substring containment on the lowercased input, so a
/// keyword can fire inside a longer word ("die" in "diet"). The most severe
/// matching tier always wins.
#[derive(Debug, Clone, Default)]
pub struct SeverityClassifier {
    table: KeywordTable,
}

impl SeverityClassifier {
    /// Create a classifier over a custom keyword table
    pub fn new(table: KeywordTable) -> Self {
        info!(
            "Creating severity classifier ({} keyword sets)",
            table.sets().len()
        );
        Self { table }
    }

    /// Assign exactly one tier to `text`
    pub fn classify(&self, text: &str) -> SeverityTier {
        self.classify_with_match(text).severity
    }

    /// Assign a tier and report the keyword that triggered it
    pub fn classify_with_match(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();

        for set in self.table.sets() {
            if let Some(keyword) = set.find_in(&lowered) {
                debug!("Matched keyword {:?} -> {}", keyword, set.tier());
                return Classification {
                    severity: set.tier(),
                    matched_keyword: Some(keyword.to_string()),
                };
            }
        }

        Classification {
            severity: SeverityTier::Low,
            matched_keyword: None,
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }
}

/// Classify with the built-in keyword table
pub fn classify(text: &str) -> SeverityTier {
    static DEFAULT: OnceLock<SeverityClassifier> = OnceLock::new();
    DEFAULT.get_or_init(SeverityClassifier::default).classify(text)
}
