//! Severity Classification
//!
//! Maps a free-text patient message to a severity tier using ordered
//! keyword-set membership tests, and extracts lightweight text signals
//! (script language, cultural idioms of distress).

mod classifier;
mod idioms;
mod keywords;
mod language;
mod severity;

pub use classifier::{classify, Classification, SeverityClassifier};
pub use idioms::{detect_idioms, Idiom};
pub use keywords::{KeywordLists, KeywordSet, KeywordTable};
pub use language::{detect_language, Language};
pub use severity::{ParseSeverityError, SeverityTier};
