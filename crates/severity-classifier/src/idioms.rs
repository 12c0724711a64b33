//! Cultural idioms of distress
//!
//! Patients often describe distress through idioms rather than clinical
//! terms. Detected idioms are surfaced to health workers as context badges.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Idiom {
    HeartFeelsHeavy,
    MindIsCrowded,
}

impl Idiom {
    /// Badge label, independent of the language the idiom was written in
    pub fn label(&self) -> &'static str {
        match self {
            Idiom::HeartFeelsHeavy => "💔 Heart feels heavy",
            Idiom::MindIsCrowded => "🧠 Mind is crowded",
        }
    }
}

const IDIOM_PHRASES: &[(&str, Idiom)] = &[
    ("heart feels heavy", Idiom::HeartFeelsHeavy),
    ("mind is crowded", Idiom::MindIsCrowded),
    ("గుండె బరువుగా", Idiom::HeartFeelsHeavy),
    ("మనసు నిండిపోయింది", Idiom::MindIsCrowded),
    ("दिल भारी है", Idiom::HeartFeelsHeavy),
    ("दिमाग भरा हुआ", Idiom::MindIsCrowded),
];

/// Idioms present in `text`, each reported once in table order
pub fn detect_idioms(text: &str) -> Vec<Idiom> {
    let lowered = text.to_lowercase();
    let mut found = Vec::new();

    for (phrase, idiom) in IDIOM_PHRASES {
        if lowered.contains(phrase) && !found.contains(idiom) {
            found.push(*idiom);
        }
    }

    found
}
